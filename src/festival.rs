//! Timed world events that bend the economy for a while.

use crate::content::{ContentRegistry, FestivalContent};
use crate::core::constants::FESTIVAL_START_CHANCE_PER_TICK;
use crate::core::game_state::{GameState, NotificationKind};
use crate::currency::GameCurrency;
use crate::error::{GameError, Result};
use crate::rng::{random_choice, succeeds_chance};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FestivalState {
    /// Festival content id to the tick it ends on.
    #[serde(default)]
    pub active: BTreeMap<String, u64>,
}

fn active_festivals<'a>(
    state: &'a GameState,
    content: &'a ContentRegistry,
) -> impl Iterator<Item = &'a FestivalContent> + 'a {
    state
        .festival
        .active
        .keys()
        .filter_map(|id| content.get_entry::<FestivalContent>(id))
}

pub fn festival_currency_multiplier(
    state: &GameState,
    content: &ContentRegistry,
    currency: GameCurrency,
) -> f64 {
    active_festivals(state, content)
        .filter_map(|f| f.effects.currency_multipliers.get(&currency))
        .product()
}

/// Multiplier on travel duration. Never drops below 0.1.
pub fn festival_travel_multiplier(state: &GameState, content: &ContentRegistry) -> f64 {
    let modifier: f64 = active_festivals(state, content)
        .map(|f| f.effects.travel_time_modifier)
        .sum();
    (1.0 + modifier).max(0.1)
}

pub fn festival_xp_multiplier(state: &GameState, content: &ContentRegistry) -> f64 {
    let modifier: f64 = active_festivals(state, content)
        .map(|f| f.effects.xp_modifier)
        .sum();
    (1.0 + modifier).max(0.0)
}

pub fn festival_start(state: &mut GameState, content: &ContentRegistry, festival_id: &str) -> Result<()> {
    let festival = content
        .get_entry::<FestivalContent>(festival_id)
        .ok_or_else(|| GameError::ContentNotFound(festival_id.to_string()))?;
    let ends_at = state.now() + festival.duration;
    state.festival.active.insert(festival.id.clone(), ends_at);
    tracing::info!("festival {} started, ends at tick {ends_at}", festival.id);
    state.notify(
        NotificationKind::Info,
        format!("The {} has begun!", festival.name),
    );
    Ok(())
}

/// Ends festivals that run out within the next `ticks` and maybe starts a
/// new one. Returns the ids of festivals that ended.
pub fn festival_process<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    ticks: u64,
    rng: &mut R,
) -> Vec<String> {
    let horizon = state.now() + ticks;
    let ended: Vec<String> = state
        .festival
        .active
        .iter()
        .filter(|(_, ends_at)| **ends_at <= horizon)
        .map(|(id, _)| id.clone())
        .collect();
    for id in &ended {
        state.festival.active.remove(id);
        let name = content
            .get_entry::<FestivalContent>(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.clone());
        state.notify(NotificationKind::Info, format!("The {name} has ended."));
    }

    let start_chance = 1.0 - (1.0 - FESTIVAL_START_CHANCE_PER_TICK).powf(ticks as f64);
    if succeeds_chance(start_chance, rng) {
        let candidates: Vec<&FestivalContent> = content
            .get_entries_by_type::<FestivalContent>()
            .into_iter()
            .filter(|f| !state.festival.active.contains_key(&f.id))
            .collect();
        if let Some(festival) = random_choice(&candidates, rng) {
            let id = festival.id.clone();
            if let Err(e) = festival_start(state, content, &id) {
                tracing::warn!("could not start festival {id}: {e}");
            }
        }
    }

    ended
}
