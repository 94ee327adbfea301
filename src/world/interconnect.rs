//! Which settlements are close to what, and who controls which tiles.
//!
//! Recomputed from scratch whenever the cache is dirty.

use super::types::{LocationType, WorldLocation, WorldState};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interconnectedness {
    /// Every location id to all town ids, nearest first.
    pub nearest_towns: BTreeMap<String, Vec<String>>,
    /// Town and village id to the location ids inside its zone of control,
    /// claimed or not.
    pub zones: BTreeMap<String, BTreeSet<String>>,
    /// Covered location id to the settlement whose zone it belongs to.
    pub zone_owner: BTreeMap<String, String>,
}

pub fn interconnectedness_build(world: &WorldState) -> Interconnectedness {
    let locations: Vec<&WorldLocation> = world.locations.values().collect();
    let towns: Vec<&WorldLocation> = locations
        .iter()
        .copied()
        .filter(|l| l.node_type == LocationType::Town)
        .collect();

    let mut nearest_towns = BTreeMap::new();
    for location in &locations {
        let pos = location.position();
        let mut sorted: Vec<(f64, &str)> = towns
            .iter()
            .map(|t| (pos.distance(&t.position()), t.id.as_str()))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        nearest_towns.insert(
            location.id.clone(),
            sorted.into_iter().map(|(_, id)| id.to_string()).collect(),
        );
    }

    let centers: Vec<(&WorldLocation, f64)> = locations
        .iter()
        .copied()
        .filter_map(|l| l.node_type.zone_of_control_radius().map(|r| (l, r as f64)))
        .collect();

    let mut zones: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut zone_owner = BTreeMap::new();
    for location in &locations {
        let pos = location.position();
        let mut owner: Option<(f64, &str)> = None;
        for (center, radius) in &centers {
            let distance = pos.distance(&center.position());
            if distance > *radius {
                continue;
            }
            zones
                .entry(center.id.clone())
                .or_default()
                .insert(location.id.clone());
            let closer = match owner {
                None => true,
                Some((best, best_id)) => {
                    distance < best || (distance == best && center.id.as_str() < best_id)
                }
            };
            if closer {
                owner = Some((distance, center.id.as_str()));
            }
        }
        if let Some((_, owner_id)) = owner {
            zone_owner.insert(location.id.clone(), owner_id.to_string());
        }
    }

    Interconnectedness {
        nearest_towns,
        zones,
        zone_owner,
    }
}

/// Current interconnectedness, recomputed in full if any claim changed.
pub fn interconnectedness_recalculate(world: &mut WorldState) -> &Interconnectedness {
    if world.caches.interconnect.is_dirty() {
        let built = interconnectedness_build(world);
        return world.caches.interconnect.get_or_build(|| built);
    }
    world
        .caches
        .interconnect
        .get_or_build(Interconnectedness::default)
}

/// Whether a location sits inside any claimed settlement's zone of control.
pub fn location_in_controlled_zone(world: &mut WorldState, location_id: &str) -> bool {
    let covering: Vec<String> = interconnectedness_recalculate(world)
        .zones
        .iter()
        .filter(|(_, members)| members.contains(location_id))
        .map(|(center, _)| center.clone())
        .collect();
    covering
        .iter()
        .any(|center| world.locations.get(center).is_some_and(|l| l.currently_claimed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> WorldState {
        let mut world = WorldState::new(40, 40);
        let mut home = WorldLocation::new(10, 10, LocationType::Town, "Home");
        home.currently_claimed = true;
        world.insert_location(home);
        world.insert_location(WorldLocation::new(30, 10, LocationType::Town, "Far Town"));
        world.insert_location(WorldLocation::new(12, 10, LocationType::Cave, "Near Cave"));
        world.insert_location(WorldLocation::new(25, 10, LocationType::Cave, "Mid Cave"));
        world
    }

    #[test]
    fn test_nearest_towns_sorted() {
        let mut world = sample_world();
        let info = interconnectedness_recalculate(&mut world);
        assert_eq!(info.nearest_towns["25,10"], vec!["30,10", "10,10"]);
        assert_eq!(info.nearest_towns["12,10"][0], "10,10");
    }

    #[test]
    fn test_unclaimed_settlements_have_zones() {
        let mut world = sample_world();
        let info = interconnectedness_recalculate(&mut world).clone();
        assert_eq!(info.zone_owner.get("12,10").map(String::as_str), Some("10,10"));
        assert_eq!(info.zone_owner.get("25,10").map(String::as_str), Some("30,10"));
        assert!(info.zones["30,10"].contains("25,10"));
        assert!(info.zones["30,10"].contains("30,10"));
    }

    #[test]
    fn test_unclaimed_village_zone_does_not_control() {
        let mut world = WorldState::new(40, 40);
        world.insert_location(WorldLocation::new(5, 5, LocationType::Village, "Reedby"));
        world.insert_location(WorldLocation::new(6, 5, LocationType::Cave, "Hollow"));

        let info = interconnectedness_recalculate(&mut world).clone();
        assert!(info.zones["5,5"].contains("6,5"));
        assert_eq!(info.zone_owner["6,5"], "5,5");
        assert!(!location_in_controlled_zone(&mut world, "6,5"));

        world.set_claimed("5,5", true);
        assert!(location_in_controlled_zone(&mut world, "6,5"));
    }

    #[test]
    fn test_claim_change_triggers_recompute() {
        let mut world = sample_world();
        assert!(!location_in_controlled_zone(&mut world, "25,10"));
        world.set_claimed("30,10", true);
        assert!(location_in_controlled_zone(&mut world, "25,10"));
        assert!(location_in_controlled_zone(&mut world, "12,10"));
    }

    #[test]
    fn test_owner_is_nearest_center() {
        let mut world = WorldState::new(40, 40);
        let mut a = WorldLocation::new(0, 0, LocationType::Town, "A");
        a.currently_claimed = true;
        let mut b = WorldLocation::new(4, 0, LocationType::Village, "B");
        b.currently_claimed = true;
        world.insert_location(a);
        world.insert_location(b);
        world.insert_location(WorldLocation::new(3, 0, LocationType::Cave, "C"));

        let info = interconnectedness_recalculate(&mut world);
        assert_eq!(info.zone_owner["3,0"], "4,0");
        assert!(info.zones["0,0"].contains("3,0"));
        assert!(info.zones["4,0"].contains("3,0"));
    }
}
