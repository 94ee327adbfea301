//! Snapshots of the game state.
//!
//! Exports are plain JSON. Imports are merged key by key over a blank state,
//! so fields a save predates fall back to their defaults, then migrated so
//! the result agrees with the current content pack.

pub mod file;
pub mod migrations;

pub use file::*;
pub use migrations::*;

use crate::content::ContentRegistry;
use crate::core::game_state::GameState;
use crate::error::{GameError, Result};
use serde_json::Value;

pub fn export_state(state: &GameState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

/// Parses, merges over a blank state and migrates.
pub fn import_state(json: &str, content: &ContentRegistry) -> Result<GameState> {
    let incoming: Value = serde_json::from_str(json)?;
    if !incoming.is_object() {
        return Err(GameError::CorruptSave("snapshot is not a JSON object".to_string()));
    }
    let mut merged = serde_json::to_value(GameState::blank())?;
    merge_json(&mut merged, incoming);
    let mut state: GameState = serde_json::from_value(merged)?;
    migrate_state(&mut state, content);
    Ok(state)
}

/// Overlays `overlay` onto `base`. Objects merge per key; any other value,
/// arrays included, replaces the base value. `null` keeps the base value.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
