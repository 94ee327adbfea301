//! The action clock: tick counter plus timers keyed by the absolute tick
//! they fire on.

use crate::content::ContentRegistry;
use crate::core::game_state::GameState;
use crate::world::{location_refresh, location_unclaim};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// A held cave or dungeon reverts to unclaimed.
    UnclaimLocation,
    /// An unclaimed location regains guardians and loot and becomes claimable.
    LocationRefresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    #[serde(rename = "type")]
    pub kind: TimerKind,
    /// Location id (`"x,y"`).
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionClock {
    #[serde(default)]
    pub num_ticks: u64,
    #[serde(default)]
    pub timers: BTreeMap<u64, Vec<Timer>>,
}

impl ActionClock {
    /// True once the clock has reached or passed `tick`.
    pub fn is_expired(&self, tick: u64) -> bool {
        self.num_ticks >= tick
    }

    pub fn schedule(&mut self, tick: u64, timer: Timer) {
        self.timers.entry(tick).or_default().push(timer);
    }

    /// Drops any pending timer of `kind` for `location`.
    pub fn cancel(&mut self, kind: TimerKind, location: &str) {
        for timers in self.timers.values_mut() {
            timers.retain(|t| !(t.kind == kind && t.location == location));
        }
        self.timers.retain(|_, timers| !timers.is_empty());
    }

    /// Removes and returns every timer due at or before `tick`, in tick order.
    pub fn take_due(&mut self, tick: u64) -> Vec<(u64, Timer)> {
        let later = self.timers.split_off(&tick.saturating_add(1));
        let due = std::mem::replace(&mut self.timers, later);
        due.into_iter()
            .flat_map(|(at, timers)| timers.into_iter().map(move |t| (at, t)))
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.timers.values().map(Vec::len).sum()
    }
}

/// Fires every timer due at or before `target_tick`, including timers that
/// firing schedules inside the window. Each timer runs with its own
/// scheduled tick as "now". Returns how many fired.
pub fn timers_process(state: &mut GameState, content: &ContentRegistry, target_tick: u64) -> usize {
    let mut fired = 0;
    loop {
        let due = state.action_clock.take_due(target_tick);
        if due.is_empty() {
            break;
        }
        fired += due.len();
        for (at, timer) in due {
            if !state.world.locations.contains_key(&timer.location) {
                tracing::warn!(
                    "timer {:?} references missing location {}, dropping",
                    timer.kind,
                    timer.location
                );
                continue;
            }
            match timer.kind {
                TimerKind::UnclaimLocation => {
                    if let Err(e) = location_unclaim(state, &timer.location, at) {
                        tracing::warn!("unclaim timer for {} failed: {e}", timer.location);
                    }
                }
                TimerKind::LocationRefresh => location_refresh(state, content, &timer.location),
            }
        }
    }
    fired
}
