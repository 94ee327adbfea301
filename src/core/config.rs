//! Engine configuration. Every field has a default, so a config file only
//! needs the values it overrides.

use super::constants::{
    DEFAULT_MAX_ENCOUNTER_LEVEL, DEFAULT_MIN_NODE_DISTANCE, DEFAULT_SAVE_INTERVAL_TICKS,
    DEFAULT_TICK_MULTIPLIER, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};
use crate::error::Result;
use crate::world::LocationType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Knobs the gameloop reads on every advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameloopOptions {
    /// Ticks simulated per elapsed second.
    pub tick_multiplier: f64,
    /// Ticks between persistence checkpoints.
    pub save_interval_ticks: u64,
    pub paused: bool,
    /// Cleared while something else owns the state (e.g. a worker is running).
    pub can_run: bool,
}

impl Default for GameloopOptions {
    fn default() -> Self {
        Self {
            tick_multiplier: DEFAULT_TICK_MULTIPLIER,
            save_interval_ticks: DEFAULT_SAVE_INTERVAL_TICKS,
            paused: false,
            can_run: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    /// How many nodes of each type to place, the home town included.
    pub node_counts: BTreeMap<LocationType, u32>,
    pub min_node_distance: f64,
    pub max_encounter_level: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let node_counts = BTreeMap::from([
            (LocationType::Town, 4),
            (LocationType::Village, 8),
            (LocationType::Cave, 10),
            (LocationType::Dungeon, 6),
            (LocationType::Castle, 3),
        ]);
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            node_counts,
            min_node_distance: DEFAULT_MIN_NODE_DISTANCE,
            max_encounter_level: DEFAULT_MAX_ENCOUNTER_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gameloop: GameloopOptions,
    pub world: WorldConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
