//! Error types surfaced by player-facing operations.
//!
//! Tick sub-phases never return these; they degrade to status messages and
//! warn logs instead. Everything a caller can ask for explicitly (equip,
//! upgrade, salvage, import) reports failure through [`GameError`].

use crate::currency::GameCurrency;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("content entry not found: {0}")]
    ContentNotFound(String),

    #[error("no eligible {kind} candidates (max drop level {max_drop_level})")]
    NoEligibleContent {
        kind: &'static str,
        max_drop_level: u32,
    },

    #[error("not enough {currency:?}: need {needed}, have {available}")]
    InsufficientCurrency {
        currency: GameCurrency,
        needed: f64,
        available: f64,
    },

    #[error("invalid {currency:?} amount: {amount}")]
    InvalidAmount { currency: GameCurrency, amount: f64 },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid slot {slot} (capacity {capacity})")]
    InvalidSlot { slot: usize, capacity: usize },

    #[error("requirement not met: {0}")]
    Requirement(String),

    #[error("world generation was cancelled")]
    GenerationCancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted save: {0}")]
    CorruptSave(String),

    #[error("gameloop worker failed: {0}")]
    Worker(String),
}

impl GameError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        GameError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
