use super::cache::WorldCaches;
use crate::currency::CurrencyBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocationType {
    Town,
    Village,
    Cave,
    Dungeon,
    Castle,
}

impl LocationType {
    pub fn all() -> [LocationType; 5] {
        [
            LocationType::Town,
            LocationType::Village,
            LocationType::Cave,
            LocationType::Dungeon,
            LocationType::Castle,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            LocationType::Town => "Town",
            LocationType::Village => "Village",
            LocationType::Cave => "Cave",
            LocationType::Dungeon => "Dungeon",
            LocationType::Castle => "Castle",
        }
    }

    /// Fog radius lifted around a claimed location of this type.
    pub fn reveal_radius(&self) -> i32 {
        match self {
            LocationType::Town => 5,
            LocationType::Village => 3,
            LocationType::Cave => 2,
            LocationType::Dungeon => 2,
            LocationType::Castle => 4,
        }
    }

    /// Zone of control radius. Only settlements project one.
    pub fn zone_of_control_radius(&self) -> Option<i32> {
        match self {
            LocationType::Town => Some(6),
            LocationType::Village => Some(3),
            _ => None,
        }
    }

    /// Types that always get one node close to home, so a new party has
    /// somewhere to go.
    pub fn is_starter(&self) -> bool {
        matches!(self, LocationType::Village | LocationType::Cave)
    }

    /// Whether a claimed location of this type lets the party heal.
    pub fn is_restful(&self) -> bool {
        matches!(self, LocationType::Town)
    }

    /// Per-tick production while claimed.
    pub fn currency_production(&self) -> CurrencyBlock {
        let mut block = CurrencyBlock::new();
        match self {
            LocationType::Town => {
                block.mana = 0.5;
                block.food = 0.5;
            }
            LocationType::Village => {
                block.food = 1.0;
                block.wood = 0.5;
            }
            LocationType::Cave => {
                block.stone = 1.0;
                block.clay = 0.5;
            }
            LocationType::Dungeon => {
                block.mana = 1.0;
                block.soul_essence = 0.1;
            }
            LocationType::Castle => {
                block.mana = 1.0;
                block.wood = 0.5;
                block.stone = 0.5;
                block.soul_essence = 0.2;
            }
        }
        block
    }

    /// Inclusive range of guardians placed on the location.
    pub fn guardian_count(&self) -> (usize, usize) {
        match self {
            LocationType::Town => (2, 3),
            LocationType::Village => (1, 2),
            LocationType::Cave => (1, 2),
            LocationType::Dungeon => (2, 4),
            LocationType::Castle => (3, 5),
        }
    }

    pub fn claim_loot_count(&self) -> usize {
        match self {
            LocationType::Town | LocationType::Village | LocationType::Cave => 1,
            LocationType::Dungeon => 2,
            LocationType::Castle => 3,
        }
    }

    /// Encounter levels added on top of the distance-based level.
    pub fn encounter_level_bonus(&self) -> u32 {
        match self {
            LocationType::Town | LocationType::Village => 0,
            LocationType::Cave => 1,
            LocationType::Dungeon => 2,
            LocationType::Castle => 3,
        }
    }

    /// Ticks after an unclaim before the location can be claimed again.
    pub fn refresh_ticks(&self) -> u64 {
        match self {
            LocationType::Town => 1800,
            LocationType::Village => 1200,
            LocationType::Cave => 600,
            LocationType::Dungeon => 1200,
            LocationType::Castle => 3600,
        }
    }

    /// How long a claim holds before reverting. `None` holds forever.
    pub fn claim_duration(&self) -> Option<u64> {
        match self {
            LocationType::Cave => Some(1800),
            LocationType::Dungeon => Some(3600),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Location ids are the `"x,y"` key of their position.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLocation {
    pub id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub node_type: LocationType,
    #[serde(default)]
    pub currently_claimed: bool,
    #[serde(default)]
    pub claim_count: u32,
    /// Tick at which an unclaimed location becomes claimable again.
    #[serde(default)]
    pub unclaim_time: Option<u64>,
    #[serde(default)]
    pub permanently_claimed: bool,
    #[serde(default)]
    pub encounter_level: u32,
    #[serde(default)]
    pub guardian_ids: Vec<String>,
    #[serde(default)]
    pub claim_loot_ids: Vec<String>,
    #[serde(default)]
    pub trait_ids: Vec<String>,
}

impl WorldLocation {
    pub fn new(x: i32, y: i32, node_type: LocationType, name: &str) -> Self {
        Self {
            id: Position::new(x, y).key(),
            name: name.to_string(),
            x,
            y,
            node_type,
            currently_claimed: false,
            claim_count: 0,
            unclaim_time: None,
            permanently_claimed: false,
            encounter_level: 1,
            guardian_ids: Vec::new(),
            claim_loot_ids: Vec::new(),
            trait_ids: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldState {
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    /// Keyed by location id.
    #[serde(default)]
    pub locations: BTreeMap<String, WorldLocation>,
    #[serde(default)]
    pub home: Position,
    /// Currently claimed locations per type. Only [`WorldState::set_claimed`]
    /// and [`super::world_recount_claims`] write it.
    #[serde(default)]
    pub claimed_counts: BTreeMap<LocationType, u32>,
    #[serde(default)]
    pub node_counts: BTreeMap<LocationType, u32>,
    #[serde(skip)]
    pub caches: WorldCaches,
}

impl WorldState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn insert_location(&mut self, location: WorldLocation) {
        if let Some(previous) = self.locations.remove(&location.id) {
            tracing::warn!("replacing location {} at {}", previous.name, previous.id);
            decrement(&mut self.node_counts, previous.node_type);
            if previous.currently_claimed {
                decrement(&mut self.claimed_counts, previous.node_type);
            }
        }
        *self.node_counts.entry(location.node_type).or_insert(0) += 1;
        if location.currently_claimed {
            *self.claimed_counts.entry(location.node_type).or_insert(0) += 1;
        }
        self.locations.insert(location.id.clone(), location);
        self.caches.invalidate();
    }

    pub fn location_at(&self, position: Position) -> Option<&WorldLocation> {
        self.locations.get(&position.key())
    }

    pub fn claimed_count(&self, node_type: LocationType) -> u32 {
        self.claimed_counts.get(&node_type).copied().unwrap_or(0)
    }

    pub fn node_count(&self, node_type: LocationType) -> u32 {
        self.node_counts.get(&node_type).copied().unwrap_or(0)
    }

    /// The one place claim status changes. Keeps `claimed_counts` in
    /// `[0, node_counts[type]]` and marks derived caches dirty. Returns
    /// whether anything changed.
    pub fn set_claimed(&mut self, location_id: &str, claimed: bool) -> bool {
        let Some(location) = self.locations.get_mut(location_id) else {
            return false;
        };
        if location.currently_claimed == claimed {
            return false;
        }
        location.currently_claimed = claimed;
        let node_type = location.node_type;

        if claimed {
            let cap = self.node_count(node_type);
            let count = self.claimed_counts.entry(node_type).or_insert(0);
            *count = (*count + 1).min(cap);
        } else {
            decrement(&mut self.claimed_counts, node_type);
        }
        self.caches.invalidate();
        true
    }
}

fn decrement(counts: &mut BTreeMap<LocationType, u32>, node_type: LocationType) {
    if let Some(count) = counts.get_mut(&node_type) {
        *count = count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_key_and_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(b.key(), "3,4");
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_only_settlements_project_control() {
        assert!(LocationType::Town.zone_of_control_radius().is_some());
        assert!(LocationType::Village.zone_of_control_radius().is_some());
        assert!(LocationType::Cave.zone_of_control_radius().is_none());
        assert!(LocationType::Castle.zone_of_control_radius().is_none());
    }

    #[test]
    fn test_only_caves_and_dungeons_expire() {
        for node_type in LocationType::all() {
            let expires = matches!(node_type, LocationType::Cave | LocationType::Dungeon);
            assert_eq!(node_type.claim_duration().is_some(), expires);
        }
    }

    #[test]
    fn test_set_claimed_tracks_counts() {
        let mut world = WorldState::new(10, 10);
        world.insert_location(WorldLocation::new(1, 1, LocationType::Cave, "A"));
        world.insert_location(WorldLocation::new(2, 2, LocationType::Cave, "B"));

        assert!(world.set_claimed("1,1", true));
        assert!(!world.set_claimed("1,1", true));
        assert_eq!(world.claimed_count(LocationType::Cave), 1);
        assert!(world.set_claimed("2,2", true));
        assert_eq!(world.claimed_count(LocationType::Cave), 2);
        assert!(world.set_claimed("1,1", false));
        assert_eq!(world.claimed_count(LocationType::Cave), 1);
        assert!(!world.set_claimed("9,9", true));
    }

    #[test]
    fn test_insert_replaces_and_recounts() {
        let mut world = WorldState::new(10, 10);
        let mut claimed = WorldLocation::new(1, 1, LocationType::Town, "Old");
        claimed.currently_claimed = true;
        world.insert_location(claimed);
        world.insert_location(WorldLocation::new(1, 1, LocationType::Village, "New"));

        assert_eq!(world.node_count(LocationType::Town), 0);
        assert_eq!(world.claimed_count(LocationType::Town), 0);
        assert_eq!(world.node_count(LocationType::Village), 1);
    }

    #[test]
    fn test_world_json_skips_caches() {
        let mut world = WorldState::new(4, 4);
        world.insert_location(WorldLocation::new(0, 0, LocationType::Town, "Home"));
        let json = serde_json::to_string(&world).unwrap();
        assert!(!json.contains("caches"));
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.locations.len(), 1);
    }
}
