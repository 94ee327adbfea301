//! Moving the party between locations, by order or on its own.

use super::claim::location_is_claimable;
use super::fog::fog_is_position_revealed;
use super::interconnect::location_in_controlled_zone;
use super::types::{Position, WorldLocation};
use crate::content::{ContentRegistry, TraitLocationContent};
use crate::core::constants::{TRAVEL_TICKS_PER_DISTANCE, ZONE_OF_CONTROL_TRAVEL_BONUS};
use crate::core::game_state::GameState;
use crate::error::{GameError, Result};
use crate::festival::festival_travel_multiplier;
use crate::riftglow::{riftglow_bonus, RiftglowUpgrade};
use serde::{Deserialize, Serialize};

/// A journey in progress. The duration is fixed when the journey starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelState {
    pub from: Position,
    pub to: Position,
    pub ticks_total: u64,
    pub ticks_left: u64,
}

impl TravelState {
    /// Fraction completed, `(total - left) / total` clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.ticks_total == 0 {
            return 1.0;
        }
        let done = self.ticks_total.saturating_sub(self.ticks_left) as f64;
        (done / self.ticks_total as f64).clamp(0.0, 1.0)
    }

    /// Linear interpolation between the endpoints.
    pub fn current_position(&self) -> (f64, f64) {
        let t = self.progress();
        let x = self.from.x as f64 + (self.to.x - self.from.x) as f64 * t;
        let y = self.from.y as f64 + (self.to.y - self.from.y) as f64 * t;
        (x, y)
    }
}

/// Ticks to travel to `destination` with every modifier in effect now.
pub fn travel_duration(
    state: &mut GameState,
    content: &ContentRegistry,
    from: Position,
    destination: &WorldLocation,
) -> u64 {
    let base = from.distance(&destination.position()) * TRAVEL_TICKS_PER_DISTANCE;

    let trait_modifier: f64 = destination
        .trait_ids
        .iter()
        .filter_map(|id| content.get_entry::<TraitLocationContent>(id))
        .map(|t| t.travel_time_modifier)
        .sum();
    let trait_multiplier = (1.0 + trait_modifier).max(0.1);
    let festival_multiplier = festival_travel_multiplier(state, content);
    let riftglow_multiplier = 1.0 / (1.0 + riftglow_bonus(state, RiftglowUpgrade::TravelSpeed));
    let zone_multiplier = if location_in_controlled_zone(&mut state.world, &destination.id) {
        1.0 - ZONE_OF_CONTROL_TRAVEL_BONUS
    } else {
        1.0
    };

    let ticks = base * trait_multiplier * festival_multiplier * riftglow_multiplier * zone_multiplier;
    (ticks.ceil() as u64).max(1)
}

/// Starts a journey to a location. Travelling to where the party already
/// stands is a no-op.
pub fn travel_to_node(state: &mut GameState, content: &ContentRegistry, location_id: &str) -> Result<()> {
    if state.hero.combat.is_some() {
        return Err(GameError::Requirement("cannot travel during combat".to_string()));
    }
    let destination = state
        .world
        .locations
        .get(location_id)
        .cloned()
        .ok_or_else(|| GameError::not_found("location", location_id))?;

    let from = state.hero.position;
    state.hero.exploring = None;
    if from == destination.position() {
        state.hero.travel = None;
        return Ok(());
    }

    let ticks = travel_duration(state, content, from, &destination);
    tracing::debug!("travel {} -> {} takes {ticks} ticks", from.key(), destination.id);
    state.hero.travel = Some(TravelState {
        from,
        to: destination.position(),
        ticks_total: ticks,
        ticks_left: ticks,
    });
    state.hero.status_message = format!("Traveling to {}", destination.name);
    Ok(())
}

/// Advances a journey by one tick. Returns the destination on arrival.
pub fn travel_process(state: &mut GameState) -> Option<Position> {
    let travel = state.hero.travel.as_mut()?;
    travel.ticks_left = travel.ticks_left.saturating_sub(1);
    if travel.ticks_left > 0 {
        return None;
    }
    let arrived = travel.to;
    state.hero.travel = None;
    state.hero.position = arrived;
    let name = state
        .world
        .location_at(arrived)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| arrived.key());
    state.hero.status_message = format!("Arrived at {name}");
    Some(arrived)
}

/// Closest revealed, claimable location whose encounter level is within
/// the party's risk tolerance. Ties go to the lower id.
pub fn auto_travel_pick_target(state: &mut GameState) -> Option<String> {
    let max_level = state.hero.party_level() + state.hero.risk_tolerance.level_margin();
    let position = state.hero.position;
    let candidates: Vec<(f64, String, Position)> = state
        .world
        .locations
        .values()
        .filter(|l| location_is_claimable(l) && l.encounter_level <= max_level)
        .map(|l| (position.distance(&l.position()), l.id.clone(), l.position()))
        .collect();

    let mut best: Option<(f64, String)> = None;
    for (distance, id, pos) in candidates {
        if !fog_is_position_revealed(&mut state.world, pos.x, pos.y) {
            continue;
        }
        let better = match &best {
            None => true,
            Some((best_distance, best_id)) => {
                distance < *best_distance || (distance == *best_distance && id < *best_id)
            }
        };
        if better {
            best = Some((distance, id));
        }
    }
    best.map(|(_, id)| id)
}

/// Sends an idle party towards its next target, or explains why it waits.
/// Returns true if a journey started.
pub fn auto_travel_process(state: &mut GameState, content: &ContentRegistry) -> bool {
    if state.hero.is_busy() || state.hero.heroes.is_empty() {
        return false;
    }
    if !state.hero.any_alive() {
        state.hero.status_message = "The party has fallen and is recovering.".to_string();
        return false;
    }
    let resting = state.hero.heroes.iter().any(|h| h.hp < h.max_hp());
    let in_claimed_town = state
        .world
        .location_at(state.hero.position)
        .is_some_and(|l| l.currently_claimed && l.node_type.is_restful());
    if resting && in_claimed_town {
        state.hero.status_message = "Resting in town.".to_string();
        return false;
    }

    match auto_travel_pick_target(state) {
        Some(target) => {
            let at_target = state.hero.position.key() == target;
            if at_target {
                return false;
            }
            match travel_to_node(state, content, &target) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("auto-travel to {target} failed: {e}");
                    false
                }
            }
        }
        None => {
            state.hero.status_message =
                "Nothing within reach. The party waits for a new opportunity.".to_string();
            false
        }
    }
}
