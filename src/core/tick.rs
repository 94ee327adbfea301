//! The gameloop: turns elapsed wall-clock time into a batch of simulation
//! ticks and runs every sub-phase in a fixed order.
//!
//! Batch-level phases run once per advance (currency, festivals, timers);
//! party phases run once per tick (auto-travel, town, travel,
//! explore/combat). The tick counter moves once, by the whole batch, at the
//! end. [`gameloop_run_ticks`] is the pure core shared by the live loop, the
//! worker and the simulator binary.

use super::config::GameloopOptions;
use super::constants::{EXPLORE_TICKS, MAX_TICKS_PER_ADVANCE, MIN_TICKS_PER_ADVANCE};
use super::game_state::GameState;
use super::store::GameStore;
use super::timers::timers_process;
use crate::combat::CombatOutcome;
use crate::content::ContentRegistry;
use crate::currency::{currency_accrue, CurrencyBlock};
use crate::error::Result;
use crate::festival::festival_process;
use crate::rng::{seeded_rng, GameRng};
use crate::town::town_process;
use crate::world::{auto_travel_process, explore_process, travel_process, ExploreOutcome, Position};
use rand::Rng;
use std::time::Instant;

/// Ticks for `elapsed_seconds` of wall-clock time, clamped to `[1, 3600]`.
pub fn elapsed_to_ticks(elapsed_seconds: f64, tick_multiplier: f64) -> u64 {
    let raw = elapsed_seconds * tick_multiplier;
    if !raw.is_finite() || raw < MIN_TICKS_PER_ADVANCE as f64 {
        return MIN_TICKS_PER_ADVANCE;
    }
    (raw.floor() as u64).clamp(MIN_TICKS_PER_ADVANCE, MAX_TICKS_PER_ADVANCE)
}

/// The generator for one advance starting at `tick`.
pub fn advance_rng(game_id: &str, tick: u64) -> GameRng {
    seeded_rng(&format!("{game_id}-advance-{tick}"))
}

/// Something that happened during a batch, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    CurrencyAccrued(CurrencyBlock),
    FestivalEnded(String),
    TimersFired(usize),
    TravelStarted { destination: Position },
    Arrived(Position),
    ExploreStarted,
    CombatStarted { location: String },
    CombatEnded { location: String, outcome: CombatOutcome },
    Claimed { location: String },
}

#[derive(Debug, Clone, Default)]
pub struct TickResult {
    pub ticks: u64,
    pub events: Vec<TickEvent>,
}

/// Runs `ticks` ticks of simulation against `state`.
pub fn gameloop_run_ticks<R: Rng>(
    state: &mut GameState,
    content: &ContentRegistry,
    ticks: u64,
    rng: &mut R,
) -> TickResult {
    let mut result = TickResult {
        ticks,
        events: Vec::new(),
    };
    let base = state.now();
    let started = Instant::now();

    let gained = currency_accrue(state, content, ticks);
    if !gained.is_empty() {
        result.events.push(TickEvent::CurrencyAccrued(gained));
    }
    for id in festival_process(state, content, ticks, rng) {
        result.events.push(TickEvent::FestivalEnded(id));
    }
    let fired = timers_process(state, content, base + ticks);
    if fired > 0 {
        result.events.push(TickEvent::TimersFired(fired));
    }

    for offset in 0..ticks {
        let now = base + offset;

        if auto_travel_process(state, content) {
            if let Some(travel) = &state.hero.travel {
                result.events.push(TickEvent::TravelStarted {
                    destination: travel.to,
                });
            }
        }
        town_process(state, content, rng);
        if let Some(arrived) = travel_process(state) {
            result.events.push(TickEvent::Arrived(arrived));
        }

        let fighting_at = state.hero.combat.as_ref().map(|c| c.location_id.clone());
        match explore_process(state, content, now, rng) {
            ExploreOutcome::Exploring if fighting_at.is_none() && is_fresh(state) => {
                result.events.push(TickEvent::ExploreStarted);
            }
            ExploreOutcome::CombatStarted(location) => {
                result.events.push(TickEvent::CombatStarted { location });
            }
            ExploreOutcome::CombatRound(outcome) if outcome != CombatOutcome::Ongoing => {
                result.events.push(TickEvent::CombatEnded {
                    location: fighting_at.unwrap_or_default(),
                    outcome,
                });
            }
            ExploreOutcome::Claimed(location) => {
                result.events.push(TickEvent::Claimed { location });
            }
            _ => {}
        }
    }

    state.action_clock.num_ticks = base + ticks;
    tracing::debug!(
        "ran {ticks} ticks ({} -> {}) in {:?}",
        base,
        state.now(),
        started.elapsed()
    );
    result
}

/// True on the tick an exploration began.
fn is_fresh(state: &GameState) -> bool {
    state
        .hero
        .exploring
        .as_ref()
        .is_some_and(|e| e.ticks_left == EXPLORE_TICKS)
}

/// Drives a [`GameStore`] from wall-clock time and checkpoints it.
///
/// The last checkpoint tick lives in the state's meta, so a reset or an
/// import swapped into the store starts its own save interval.
#[derive(Debug, Clone)]
pub struct Gameloop {
    pub options: GameloopOptions,
}

impl Gameloop {
    pub fn new(options: GameloopOptions) -> Self {
        Self { options }
    }

    /// Whether an advance would do anything right now.
    pub fn can_advance(&self, store: &GameStore) -> bool {
        store.is_loaded() && store.get().meta.is_setup && self.options.can_run && !self.options.paused
    }

    /// Simulates `elapsed_seconds` of play. Returns `None` when the loop
    /// is not allowed to run. Saves once enough ticks have passed since
    /// the last checkpoint.
    pub fn advance(
        &mut self,
        store: &mut GameStore,
        content: &ContentRegistry,
        elapsed_seconds: f64,
    ) -> Result<Option<TickResult>> {
        if !self.can_advance(store) {
            return Ok(None);
        }
        let ticks = elapsed_to_ticks(elapsed_seconds, self.options.tick_multiplier);
        let mut rng = advance_rng(&store.get().meta.game_id, store.get().now());
        let result = store.update(|state| gameloop_run_ticks(state, content, ticks, &mut rng));

        let state = store.get();
        if state.now().saturating_sub(state.meta.last_save_tick) >= self.options.save_interval_ticks {
            std::thread::yield_now();
            store.save()?;
        }
        Ok(Some(result))
    }
}
