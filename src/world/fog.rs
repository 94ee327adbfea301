use super::types::{Position, WorldLocation, WorldState};
use std::collections::{BTreeMap, HashSet};

fn build_revealed(locations: &BTreeMap<String, WorldLocation>) -> HashSet<Position> {
    let mut revealed = HashSet::new();
    for location in locations.values().filter(|l| l.currently_claimed) {
        let center = location.position();
        let radius = location.node_type.reveal_radius();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let pos = Position::new(center.x + dx, center.y + dy);
                if center.distance(&pos) <= radius as f64 {
                    revealed.insert(pos);
                }
            }
        }
    }
    tracing::debug!("rebuilt fog cache: {} revealed tiles", revealed.len());
    revealed
}

/// Every revealed position, rebuilding the cache if a claim changed.
pub fn fog_revealed_positions(world: &mut WorldState) -> &HashSet<Position> {
    let locations = &world.locations;
    world.caches.revealed.get_or_build(|| build_revealed(locations))
}

/// Whether `(x, y)` lies within the reveal radius of any claimed location.
pub fn fog_is_position_revealed(world: &mut WorldState, x: i32, y: i32) -> bool {
    fog_revealed_positions(world).contains(&Position::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::LocationType;

    fn world_with_claimed_town() -> WorldState {
        let mut world = WorldState::new(30, 30);
        let mut town = WorldLocation::new(10, 10, LocationType::Town, "Home");
        town.currently_claimed = true;
        world.insert_location(town);
        world.insert_location(WorldLocation::new(20, 10, LocationType::Cave, "Far Cave"));
        world
    }

    #[test]
    fn test_reveal_radius_around_claimed() {
        let mut world = world_with_claimed_town();
        let radius = LocationType::Town.reveal_radius();
        assert!(fog_is_position_revealed(&mut world, 10, 10));
        assert!(fog_is_position_revealed(&mut world, 10 + radius, 10));
        assert!(!fog_is_position_revealed(&mut world, 10 + radius + 1, 10));
        assert!(!fog_is_position_revealed(&mut world, 20, 10));
    }

    #[test]
    fn test_claim_invalidates_fog() {
        let mut world = world_with_claimed_town();
        assert!(!fog_is_position_revealed(&mut world, 20, 10));
        assert!(!world.caches.revealed.is_dirty());

        world.set_claimed("20,10", true);
        assert!(world.caches.revealed.is_dirty());
        assert!(fog_is_position_revealed(&mut world, 20, 10));
        assert!(fog_is_position_revealed(&mut world, 21, 11));
    }
}
