//! Exploring the location the party stands on, up to the fight or claim.

use super::claim::{location_claim, location_grant_loot, location_is_claimable};
use crate::combat::{combat_process, combat_start, CombatOutcome};
use crate::content::ContentRegistry;
use crate::core::constants::EXPLORE_TICKS;
use crate::core::game_state::GameState;
use crate::error::{GameError, Result};
use crate::hero::ExploreState;
use rand::Rng;

/// What the exploration phase did this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ExploreOutcome {
    Idle,
    Exploring,
    CombatStarted(String),
    CombatRound(CombatOutcome),
    /// Claimed without a fight because nothing guarded it.
    Claimed(String),
}

/// Begins exploring a claimable location the party is standing on.
pub fn explore_start(state: &mut GameState, location_id: &str) -> Result<()> {
    let location = state
        .world
        .locations
        .get(location_id)
        .ok_or_else(|| GameError::not_found("location", location_id))?;
    if location.position() != state.hero.position {
        return Err(GameError::Requirement(format!(
            "the party is not at {}",
            location.name
        )));
    }
    if !location_is_claimable(location) {
        return Err(GameError::Requirement(format!("{} is not claimable", location.name)));
    }
    if state.hero.combat.is_some() || state.hero.travel.is_some() {
        return Err(GameError::Requirement("the party is busy".to_string()));
    }
    state.hero.status_message = format!("Exploring {}", location.name);
    state.hero.exploring = Some(ExploreState {
        location: location_id.to_string(),
        ticks_left: EXPLORE_TICKS,
    });
    Ok(())
}

/// Runs one tick of exploration or combat. An idle, living party standing
/// on a claimable location starts exploring it.
pub fn explore_process<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    now: u64,
    rng: &mut R,
) -> ExploreOutcome {
    if state.hero.combat.is_some() {
        return ExploreOutcome::CombatRound(combat_process(state, content, now, rng));
    }
    if state.hero.travel.is_some() || !state.hero.any_alive() {
        return ExploreOutcome::Idle;
    }

    if state.hero.exploring.is_none() {
        let here = state
            .world
            .location_at(state.hero.position)
            .filter(|l| location_is_claimable(l))
            .map(|l| l.id.clone());
        return match here {
            Some(id) if explore_start(state, &id).is_ok() => ExploreOutcome::Exploring,
            _ => ExploreOutcome::Idle,
        };
    }
    let Some(explore) = state.hero.exploring.as_mut() else {
        return ExploreOutcome::Idle;
    };

    explore.ticks_left = explore.ticks_left.saturating_sub(1);
    if explore.ticks_left > 0 {
        return ExploreOutcome::Exploring;
    }
    let location_id = explore.location.clone();
    state.hero.exploring = None;

    let Some(location) = state.world.locations.get(&location_id) else {
        tracing::warn!("explored location {location_id} no longer exists");
        state.hero.status_message = "The trail went cold.".to_string();
        return ExploreOutcome::Idle;
    };
    if !location_is_claimable(location) {
        return ExploreOutcome::Idle;
    }
    let guarded = !location.guardian_ids.is_empty();

    if guarded {
        match combat_start(state, content, &location_id, rng) {
            Ok(true) => return ExploreOutcome::CombatStarted(location_id),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("could not start combat at {location_id}: {e}");
                state.hero.status_message = "The party hesitates.".to_string();
                return ExploreOutcome::Idle;
            }
        }
    }

    location_grant_loot(state, content, &location_id, rng);
    match location_claim(state, &location_id, now) {
        Ok(()) => ExploreOutcome::Claimed(location_id),
        Err(e) => {
            tracing::warn!("claiming {location_id} failed: {e}");
            ExploreOutcome::Idle
        }
    }
}
