//! Starting and resetting a game.

use super::config::WorldConfig;
use super::constants::{PARTY_SIZE, SAVE_VERSION};
use super::game_state::{GameState, MetaState};
use crate::content::{ContentRegistry, JobContent};
use crate::error::{GameError, Result};
use crate::hero::{hero_create, HeroState};
use crate::rng::seeded_rng;
use crate::world::{CancelToken, WorldGenerator};
use chrono::Utc;

pub const HERO_NAMES: [&str; 8] = [
    "Ayla", "Borin", "Cass", "Darrow", "Elin", "Fenna", "Garrick", "Hesper",
];

/// A fresh, set-up game for `seed`, which doubles as the game id.
pub fn setup_new_game(content: &ContentRegistry, config: &WorldConfig, seed: &str) -> Result<GameState> {
    setup_new_game_with_cancel(content, config, seed, CancelToken::new())
}

/// Like [`setup_new_game`], but world generation stops early once `cancel`
/// is set. A cancelled setup returns an error and no state.
pub fn setup_new_game_with_cancel(
    content: &ContentRegistry,
    config: &WorldConfig,
    seed: &str,
    cancel: CancelToken,
) -> Result<GameState> {
    let world = WorldGenerator::new(config, content, seed)
        .with_cancel(cancel)
        .generate()?;

    let jobs = content.get_entries_by_type::<JobContent>();
    if jobs.is_empty() {
        return Err(GameError::ContentNotFound("any job".to_string()));
    }
    let mut rng = seeded_rng(&format!("{seed}-party"));
    let mut heroes = Vec::with_capacity(PARTY_SIZE);
    for index in 0..PARTY_SIZE {
        let job = jobs[index % jobs.len()];
        let name = HERO_NAMES[index % HERO_NAMES.len()];
        heroes.push(hero_create(&format!("hero-{index}"), name, &job.id, content, &mut rng)?);
    }

    let mut state = GameState::blank();
    state.hero = HeroState {
        heroes,
        position: world.home,
        status_message: "Setting out.".to_string(),
        ..HeroState::default()
    };
    state.world = world;
    state.meta = MetaState {
        game_id: seed.to_string(),
        is_setup: true,
        created_at: Utc::now().timestamp(),
        save_version: SAVE_VERSION,
        ..MetaState::default()
    };
    tracing::info!(
        "new game {seed}: {} locations, party of {}",
        state.world.locations.len(),
        state.hero.heroes.len()
    );
    Ok(state)
}

/// Starts over with a new world and party. Riftglow carries over.
pub fn game_reset(
    previous: &GameState,
    content: &ContentRegistry,
    config: &WorldConfig,
    seed: &str,
) -> Result<GameState> {
    let mut state = setup_new_game(content, config, seed)?;
    state.riftglow = previous.riftglow.clone();
    tracing::info!("reset game {} into {seed}", previous.meta.game_id);
    Ok(state)
}
