//! Claim lifecycle of world locations.

use super::generation::location_populate;
use super::types::{LocationType, WorldLocation, WorldState};
use crate::content::ContentRegistry;
use crate::core::game_state::{GameState, NotificationKind};
use crate::core::timers::{Timer, TimerKind};
use crate::error::{GameError, Result};
use crate::items::{auto_equip_if_better, droppable_create_by_id, gain_droppable, Droppable};
use crate::riftglow::meta_check_victory;
use crate::rng::{position_seed, seeded_rng};
use rand::Rng;
use std::collections::BTreeMap;

/// Unclaimed and past any refresh cooldown.
pub fn location_is_claimable(location: &WorldLocation) -> bool {
    !location.currently_claimed && location.unclaim_time.is_none()
}

/// Claims a location at tick `now`. Caves and dungeons schedule their own
/// reversion. Claiming an already claimed location does nothing.
pub fn location_claim(state: &mut GameState, location_id: &str, now: u64) -> Result<()> {
    let location = state
        .world
        .locations
        .get_mut(location_id)
        .ok_or_else(|| GameError::not_found("location", location_id))?;
    if location.currently_claimed {
        return Ok(());
    }
    location.claim_count += 1;
    location.unclaim_time = None;
    location.guardian_ids.clear();
    let node_type = location.node_type;
    let name = location.name.clone();

    state.world.set_claimed(location_id, true);
    state
        .action_clock
        .cancel(TimerKind::LocationRefresh, location_id);
    if let Some(duration) = node_type.claim_duration() {
        state.action_clock.schedule(
            now + duration,
            Timer {
                kind: TimerKind::UnclaimLocation,
                location: location_id.to_string(),
            },
        );
    }

    tracing::info!("claimed {name} ({location_id}) at tick {now}");
    state.notify(NotificationKind::Success, format!("{name} has been claimed!"));
    meta_check_victory(state);
    Ok(())
}

/// Releases a claim at tick `now`. Unless the location is permanent, it
/// stays unclaimable until its refresh timer fires.
pub fn location_unclaim(state: &mut GameState, location_id: &str, now: u64) -> Result<()> {
    let location = state
        .world
        .locations
        .get_mut(location_id)
        .ok_or_else(|| GameError::not_found("location", location_id))?;
    if !location.currently_claimed {
        return Ok(());
    }
    let permanent = location.permanently_claimed;
    let refresh_at = now + location.node_type.refresh_ticks();
    location.unclaim_time = if permanent { None } else { Some(refresh_at) };
    let name = location.name.clone();

    state.world.set_claimed(location_id, false);
    state
        .action_clock
        .cancel(TimerKind::UnclaimLocation, location_id);
    if !permanent {
        state.action_clock.schedule(
            refresh_at,
            Timer {
                kind: TimerKind::LocationRefresh,
                location: location_id.to_string(),
            },
        );
    }

    tracing::info!("{name} ({location_id}) is no longer claimed");
    state.notify(NotificationKind::Info, format!("{name} has fallen back into the wild."));
    Ok(())
}

/// Repopulates guardians and loot and makes the location claimable again.
pub fn location_refresh(state: &mut GameState, content: &ContentRegistry, location_id: &str) {
    let game_id = state.meta.game_id.clone();
    let Some(location) = state.world.locations.get_mut(location_id) else {
        tracing::warn!("refresh for missing location {location_id}");
        return;
    };
    if location.currently_claimed {
        return;
    }
    let purpose = format!("refresh-{}", location.claim_count);
    let mut rng = seeded_rng(&position_seed(&game_id, &purpose, location.x, location.y));
    location_populate(location, content, &mut rng);
    location.unclaim_time = None;
    tracing::debug!("refreshed {location_id}");
}

/// Rebuilds per-type node and claim counters from the locations themselves.
pub fn world_recount_claims(world: &mut WorldState) {
    let mut node_counts: BTreeMap<LocationType, u32> = BTreeMap::new();
    let mut claimed_counts: BTreeMap<LocationType, u32> = BTreeMap::new();
    for location in world.locations.values() {
        *node_counts.entry(location.node_type).or_insert(0) += 1;
        if location.currently_claimed {
            *claimed_counts.entry(location.node_type).or_insert(0) += 1;
        }
    }
    world.node_counts = node_counts;
    world.claimed_counts = claimed_counts;
    world.caches.invalidate();
}

/// Instantiates a location's claim loot into the inventory, equipping
/// upgrades on the spot. Returns the names of what was gained.
pub fn location_grant_loot<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    location_id: &str,
    rng: &mut R,
) -> Vec<String> {
    let loot_ids = match state.world.locations.get_mut(location_id) {
        Some(location) => std::mem::take(&mut location.claim_loot_ids),
        None => return Vec::new(),
    };

    let mut names = Vec::new();
    for loot_id in loot_ids {
        let Some(droppable) = droppable_create_by_id(content, &loot_id, rng) else {
            continue;
        };
        names.push(droppable.name().to_string());
        let equip_candidate = match &droppable {
            Droppable::Item(item) => Some(item.id.clone()),
            Droppable::Skill(_) => None,
        };
        gain_droppable(state, droppable);
        if let Some(item_id) = equip_candidate {
            auto_equip_if_better(state, content, &item_id);
        }
    }
    names
}
