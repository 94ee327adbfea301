//! Wayfarer - idle strategy simulation core.
//!
//! A party of heroes explores a generated world, fights the guardians of
//! each location and claims it. Claimed locations produce currency, reveal
//! the map and unlock town buildings. The whole simulation advances in
//! discrete ticks and is deterministic for a given game id.
//!
//! This crate has no rendering; it exposes the state, the gameloop and the
//! player-facing operations.

pub mod build_info;
pub mod combat;
pub mod content;
pub mod core;
pub mod currency;
pub mod error;
pub mod festival;
pub mod hero;
pub mod items;
pub mod riftglow;
pub mod rng;
pub mod save;
pub mod town;
pub mod world;

pub use content::ContentRegistry;
pub use crate::core::{GameState, GameStore, Gameloop};
pub use error::{GameError, Result};
