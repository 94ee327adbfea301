//! World generation.
//!
//! Layout and population draw from generators seeded by the game id, so the
//! same id always produces the same world. Generation can be cancelled from
//! another thread; a cancelled run returns [`GameError::GenerationCancelled`]
//! and nothing of the partial world survives.

use super::claim::world_recount_claims;
use super::types::{LocationType, Position, WorldLocation, WorldState};
use crate::content::{ContentRegistry, GuardianContent, TraitLocationContent};
use crate::core::config::WorldConfig;
use crate::core::constants::{
    CLAIM_LOOT_SKILL_CHANCE, ENCOUNTER_LEVELS_PER_TILE, HOME_TOWN_NAME, LOCATION_TRAIT_CHANCE,
    NODE_PLACEMENT_ATTEMPTS,
};
use crate::error::{GameError, Result};
use crate::items::droppable_pick_random_id;
use crate::rng::{
    position_seed, random_choice, random_choice_by_rarity, seeded_rng, succeeds_chance,
};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const NAME_PREFIXES: [&str; 16] = [
    "Amber", "Ash", "Briar", "Cinder", "Dusk", "Elder", "Frost", "Gloam", "Hollow", "Iron",
    "Moss", "Raven", "Salt", "Thorn", "Willow", "Wren",
];

/// Shared flag for aborting a running generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct WorldGenerator<'a> {
    config: &'a WorldConfig,
    content: &'a ContentRegistry,
    game_id: String,
    cancel: CancelToken,
}

impl<'a> WorldGenerator<'a> {
    pub fn new(config: &'a WorldConfig, content: &'a ContentRegistry, game_id: &str) -> Self {
        Self {
            config,
            content,
            game_id: game_id.to_string(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            tracing::info!("world generation for {} cancelled", self.game_id);
            return Err(GameError::GenerationCancelled);
        }
        Ok(())
    }

    pub fn generate(&self) -> Result<WorldState> {
        let width = self.config.width.max(1);
        let height = self.config.height.max(1);
        let mut world = WorldState::new(width, height);
        let home = Position::new(width / 2, height / 2);
        world.home = home;

        let mut home_town = WorldLocation::new(home.x, home.y, LocationType::Town, HOME_TOWN_NAME);
        home_town.currently_claimed = true;
        home_town.permanently_claimed = true;
        home_town.claim_count = 1;
        home_town.encounter_level = 1;
        let mut placed = vec![home_town];
        self.check_cancelled()?;

        let mut layout_rng = seeded_rng(&position_seed(&self.game_id, "layout", 0, 0));
        for node_type in LocationType::all() {
            let mut wanted = self.config.node_counts.get(&node_type).copied().unwrap_or(0);
            if node_type == LocationType::Town {
                wanted = wanted.saturating_sub(1);
            }
            for index in 0..wanted {
                // the first village and cave sit inside the home town's sight
                let near = (index == 0 && node_type.is_starter()).then_some(home);
                match self.place_node(&placed, width, height, near, &mut layout_rng) {
                    Some(pos) => {
                        let name = self.node_name(node_type, &mut layout_rng);
                        placed.push(WorldLocation::new(pos.x, pos.y, node_type, &name));
                    }
                    None => tracing::warn!(
                        "no room left for another {}, world has {} nodes",
                        node_type.name(),
                        placed.len()
                    ),
                }
            }
            self.check_cancelled()?;
        }

        for location in placed.iter_mut() {
            if location.permanently_claimed {
                continue;
            }
            let mut rng = seeded_rng(&position_seed(&self.game_id, "populate", location.x, location.y));
            self.roll_traits(location, &mut rng);
            location.encounter_level =
                self.encounter_level(location, home.distance(&location.position()));
            location_populate(location, self.content, &mut rng);
            self.check_cancelled()?;
        }

        for location in placed {
            world.locations.insert(location.id.clone(), location);
        }
        world_recount_claims(&mut world);
        tracing::info!(
            "generated world {} ({}x{}) with {} locations",
            self.game_id,
            width,
            height,
            world.locations.len()
        );
        Ok(world)
    }

    fn place_node<R: Rng>(
        &self,
        placed: &[WorldLocation],
        width: i32,
        height: i32,
        near: Option<Position>,
        rng: &mut R,
    ) -> Option<Position> {
        let radius = LocationType::Town.reveal_radius();
        for _ in 0..NODE_PLACEMENT_ATTEMPTS {
            let candidate = match near {
                Some(center) => Position::new(
                    (center.x + rng.gen_range(-radius..=radius)).clamp(0, width - 1),
                    (center.y + rng.gen_range(-radius..=radius)).clamp(0, height - 1),
                ),
                None => Position::new(rng.gen_range(0..width), rng.gen_range(0..height)),
            };
            if near.is_some_and(|center| center.distance(&candidate) > radius as f64) {
                continue;
            }
            let clear = placed
                .iter()
                .all(|l| l.position().distance(&candidate) >= self.config.min_node_distance.max(1.0));
            if clear {
                return Some(candidate);
            }
        }
        None
    }

    fn node_name<R: Rng>(&self, node_type: LocationType, rng: &mut R) -> String {
        let prefix = random_choice(&NAME_PREFIXES, rng).copied().unwrap_or("Nameless");
        format!("{prefix} {}", node_type.name())
    }

    fn roll_traits<R: Rng>(&self, location: &mut WorldLocation, rng: &mut R) {
        if !succeeds_chance(LOCATION_TRAIT_CHANCE, rng) {
            return;
        }
        let candidates = self.content.get_entries_by_type::<TraitLocationContent>();
        if let Some(chosen) = random_choice_by_rarity(&candidates, |t| t.rarity, rng) {
            location.trait_ids.push(chosen.id.clone());
        }
    }

    /// Grows with distance from home, plus the type's bonus and any trait
    /// modifiers, clamped to `[1, max_encounter_level]`.
    fn encounter_level(&self, location: &WorldLocation, distance: f64) -> u32 {
        let max_level = self.config.max_encounter_level.max(1);
        let from_distance = (distance * ENCOUNTER_LEVELS_PER_TILE).floor() as i64;
        let trait_modifier: i64 = location
            .trait_ids
            .iter()
            .filter_map(|id| self.content.get_entry::<TraitLocationContent>(id))
            .map(|t| t.encounter_level_modifier as i64)
            .sum();
        let level = 1 + from_distance + location.node_type.encounter_level_bonus() as i64 + trait_modifier;
        level.clamp(1, max_level as i64) as u32
    }
}

/// Rolls fresh guardians and claim loot for a location from its encounter
/// level. Permanently claimed locations get neither.
pub fn location_populate<R: Rng>(location: &mut WorldLocation, content: &ContentRegistry, rng: &mut R) {
    location.guardian_ids.clear();
    location.claim_loot_ids.clear();
    if location.permanently_claimed {
        return;
    }

    let candidates: Vec<&GuardianContent> = content
        .get_entries_by_type::<GuardianContent>()
        .into_iter()
        .filter(|g| g.min_level <= location.encounter_level)
        .collect();
    if candidates.is_empty() {
        tracing::warn!(
            "no guardians eligible for {} at level {}",
            location.id,
            location.encounter_level
        );
    } else {
        let (min, max) = location.node_type.guardian_count();
        let count = rng.gen_range(min..=max);
        for _ in 0..count {
            if let Some(guardian) = random_choice(&candidates, rng) {
                location.guardian_ids.push(guardian.id.clone());
            }
        }
    }

    for _ in 0..location.node_type.claim_loot_count() {
        match droppable_pick_random_id(content, location.encounter_level, CLAIM_LOOT_SKILL_CHANCE, rng) {
            Ok(id) => location.claim_loot_ids.push(id),
            Err(e) => tracing::warn!("no claim loot for {}: {e}", location.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WorldConfig {
        let mut config = WorldConfig::default();
        config.width = 21;
        config.height = 21;
        config
    }

    #[test]
    fn test_home_town_is_centered_and_permanent() {
        let content = ContentRegistry::bundled().unwrap();
        let config = small_config();
        let world = WorldGenerator::new(&config, &content, "seed-a").generate().unwrap();

        let home = world.location_at(Position::new(10, 10)).unwrap();
        assert_eq!(home.node_type, LocationType::Town);
        assert!(home.currently_claimed);
        assert!(home.permanently_claimed);
        assert!(home.guardian_ids.is_empty());
        assert_eq!(world.home, Position::new(10, 10));
    }

    #[test]
    fn test_generation_is_deterministic_per_game_id() {
        let content = ContentRegistry::bundled().unwrap();
        let config = small_config();
        let a = WorldGenerator::new(&config, &content, "same").generate().unwrap();
        let b = WorldGenerator::new(&config, &content, "same").generate().unwrap();
        let c = WorldGenerator::new(&config, &content, "other").generate().unwrap();
        assert_eq!(a.locations, b.locations);
        assert_ne!(a.locations, c.locations);
    }

    #[test]
    fn test_counts_match_locations() {
        let content = ContentRegistry::bundled().unwrap();
        let config = small_config();
        let world = WorldGenerator::new(&config, &content, "counts").generate().unwrap();
        for node_type in LocationType::all() {
            let nodes = world.locations.values().filter(|l| l.node_type == node_type).count() as u32;
            assert_eq!(world.node_count(node_type), nodes);
        }
        assert_eq!(world.claimed_count(LocationType::Town), 1);
    }

    #[test]
    fn test_nodes_respect_min_distance() {
        let content = ContentRegistry::bundled().unwrap();
        let config = small_config();
        let world = WorldGenerator::new(&config, &content, "spacing").generate().unwrap();
        let positions: Vec<Position> = world.locations.values().map(|l| l.position()).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(b) >= config.min_node_distance);
            }
        }
    }

    #[test]
    fn test_encounter_levels_in_range() {
        let content = ContentRegistry::bundled().unwrap();
        let config = small_config();
        let world = WorldGenerator::new(&config, &content, "levels").generate().unwrap();
        for location in world.locations.values() {
            assert!(location.encounter_level >= 1);
            assert!(location.encounter_level <= config.max_encounter_level);
        }
    }

    #[test]
    fn test_cancelled_generation_returns_error() {
        let content = ContentRegistry::bundled().unwrap();
        let config = small_config();
        let token = CancelToken::new();
        token.cancel();
        let result = WorldGenerator::new(&config, &content, "cancel")
            .with_cancel(token)
            .generate();
        assert!(matches!(result, Err(GameError::GenerationCancelled)));
    }

    #[test]
    fn test_populate_without_guardian_content() {
        let content = ContentRegistry::new(vec![]);
        let mut location = WorldLocation::new(1, 1, LocationType::Cave, "Empty");
        location_populate(&mut location, &content, &mut seeded_rng("empty"));
        assert!(location.guardian_ids.is_empty());
        assert!(location.claim_loot_ids.is_empty());
    }
}
