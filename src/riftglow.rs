//! Riftglow: meta-progression earned by claiming the whole world. It
//! survives a game reset.

use crate::core::constants::{
    RIFTGLOW_BASE_UPGRADE_COST, RIFTGLOW_BONUS_PER_LEVEL, RIFTGLOW_VICTORY_BASE_REWARD,
};
use crate::core::game_state::{GameState, NotificationKind};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiftglowUpgrade {
    CurrencyBoost,
    XpBoost,
    TravelSpeed,
}

impl RiftglowUpgrade {
    pub fn all() -> [RiftglowUpgrade; 3] {
        [
            RiftglowUpgrade::CurrencyBoost,
            RiftglowUpgrade::XpBoost,
            RiftglowUpgrade::TravelSpeed,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiftglowState {
    pub amount: u64,
    pub total_earned: u64,
    pub upgrades: BTreeMap<RiftglowUpgrade, u32>,
}

impl RiftglowState {
    pub fn level(&self, upgrade: RiftglowUpgrade) -> u32 {
        self.upgrades.get(&upgrade).copied().unwrap_or(0)
    }
}

/// Fractional bonus from an upgrade (0.05 per level).
pub fn riftglow_bonus(state: &GameState, upgrade: RiftglowUpgrade) -> f64 {
    state.riftglow.level(upgrade) as f64 * RIFTGLOW_BONUS_PER_LEVEL
}

/// Cost of buying the level after `current_level`.
pub fn riftglow_upgrade_cost(current_level: u32) -> u64 {
    let next = current_level as u64 + 1;
    RIFTGLOW_BASE_UPGRADE_COST * next * next
}

/// Buys one level of `upgrade`. Returns the new level.
pub fn riftglow_buy_upgrade(state: &mut GameState, upgrade: RiftglowUpgrade) -> Result<u32> {
    let level = state.riftglow.level(upgrade);
    let cost = riftglow_upgrade_cost(level);
    if state.riftglow.amount < cost {
        return Err(GameError::Requirement(format!(
            "{upgrade:?} level {} needs {cost} riftglow, have {}",
            level + 1,
            state.riftglow.amount
        )));
    }
    state.riftglow.amount -= cost;
    state.riftglow.upgrades.insert(upgrade, level + 1);
    Ok(level + 1)
}

pub fn riftglow_gain(state: &mut GameState, amount: u64) {
    state.riftglow.amount += amount;
    state.riftglow.total_earned += amount;
}

/// Marks the game won once every location is claimed and pays out riftglow.
/// Returns true only on the tick the victory happens.
pub fn meta_check_victory(state: &mut GameState) -> bool {
    if state.meta.has_won || state.world.locations.is_empty() {
        return false;
    }
    if !state.world.locations.values().all(|l| l.currently_claimed) {
        return false;
    }

    let reward = RIFTGLOW_VICTORY_BASE_REWARD + state.world.locations.len() as u64;
    state.meta.has_won = true;
    state.meta.won_at_tick = Some(state.now());
    riftglow_gain(state, reward);
    tracing::info!("world conquered at tick {}, awarded {reward} riftglow", state.now());
    state.notify(
        NotificationKind::Success,
        format!("Every location is yours! Gained {reward} riftglow."),
    );
    true
}
