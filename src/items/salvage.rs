//! Converting unwanted instances back into mana.

use super::equipment::item_total_stats;
use super::types::{EquipmentItem, EquipmentSkill};
use crate::content::{ContentRegistry, StatBlock, TalentContent};
use crate::core::game_state::GameState;
use crate::currency::{currency_gain, GameCurrency};
use crate::error::{GameError, Result};
use crate::town::town_salvage_bonus;

/// Mana per point of each stat.
const AURA_VALUE: f64 = 4.0;
const FORCE_VALUE: f64 = 6.0;
const HEALTH_VALUE: f64 = 2.0;
const SPEED_VALUE: f64 = 10.0;

/// Mana per drop level of a skill.
const SKILL_LEVEL_VALUE: f64 = 100.0;

pub fn stat_salvage_value(stats: &StatBlock) -> f64 {
    stats.aura * AURA_VALUE
        + stats.force * FORCE_VALUE
        + stats.health * HEALTH_VALUE
        + stats.speed * SPEED_VALUE
}

/// Unmodified salvage value of an item, traits included.
pub fn item_salvage_value(item: &EquipmentItem, content: &ContentRegistry) -> f64 {
    stat_salvage_value(&item_total_stats(item, content))
}

pub fn skill_salvage_value(skill: &EquipmentSkill) -> f64 {
    skill.drop_level as f64 * SKILL_LEVEL_VALUE
}

/// Combined multiplier from hero talents and the Salvager building.
pub fn salvage_multiplier(state: &GameState, content: &ContentRegistry) -> f64 {
    let talent_bonus: f64 = state
        .hero
        .heroes
        .iter()
        .flat_map(|hero| hero.talents.iter())
        .filter_map(|(id, points)| {
            content
                .get_entry::<TalentContent>(id)
                .map(|talent| talent.salvage_bonus * *points as f64)
        })
        .sum();
    1.0 + talent_bonus + town_salvage_bonus(state)
}

/// Removes an inventory item and credits its mana. Returns the amount gained.
pub fn item_salvage(state: &mut GameState, content: &ContentRegistry, item_id: &str) -> Result<f64> {
    let index = state
        .inventory
        .items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| GameError::not_found("item", item_id))?;
    let value = item_salvage_value(&state.inventory.items[index], content)
        * salvage_multiplier(state, content);
    state.inventory.items.remove(index);
    currency_gain(state, GameCurrency::Mana, value);
    Ok(value)
}

pub fn skill_salvage(state: &mut GameState, content: &ContentRegistry, skill_id: &str) -> Result<f64> {
    let index = state
        .inventory
        .skills
        .iter()
        .position(|s| s.id == skill_id)
        .ok_or_else(|| GameError::not_found("skill", skill_id))?;
    let value = skill_salvage_value(&state.inventory.skills[index]) * salvage_multiplier(state, content);
    state.inventory.skills.remove(index);
    currency_gain(state, GameCurrency::Mana, value);
    Ok(value)
}
