// Gameloop
pub const MIN_TICKS_PER_ADVANCE: u64 = 1;
pub const MAX_TICKS_PER_ADVANCE: u64 = 3600;
pub const DEFAULT_TICK_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_SAVE_INTERVAL_TICKS: u64 = 30;

// Inventory
pub const MAX_INVENTORY_ITEMS: usize = 50;
pub const MAX_INVENTORY_SKILLS: usize = 50;
pub const ITEM_TRAIT_CHANCE: f64 = 0.25;

// World generation
pub const DEFAULT_WORLD_WIDTH: i32 = 41;
pub const DEFAULT_WORLD_HEIGHT: i32 = 41;
pub const DEFAULT_MIN_NODE_DISTANCE: f64 = 2.0;
pub const DEFAULT_MAX_ENCOUNTER_LEVEL: u32 = 50;
/// Encounter levels gained per tile of distance from home.
pub const ENCOUNTER_LEVELS_PER_TILE: f64 = 0.3;
/// Placement attempts per node before giving up on it.
pub const NODE_PLACEMENT_ATTEMPTS: u32 = 200;
pub const LOCATION_TRAIT_CHANCE: f64 = 0.2;
pub const CLAIM_LOOT_SKILL_CHANCE: f64 = 0.25;
pub const HOME_TOWN_NAME: &str = "Hearthold";

// Travel and exploring
/// Base travel ticks per unit of distance.
pub const TRAVEL_TICKS_PER_DISTANCE: f64 = 15.0;
/// Travel inside a claimed zone of control is this much faster.
pub const ZONE_OF_CONTROL_TRAVEL_BONUS: f64 = 0.25;
pub const EXPLORE_TICKS: u64 = 10;

// Combat
pub const MAX_COMBAT_LOG_LINES: usize = 100;
pub const DEADLOCK_ROUND_INTERVAL: u32 = 25;
pub const DEADLOCK_STEP: f64 = 0.25;
pub const XP_PER_ENCOUNTER_LEVEL: u64 = 10;
pub const SOUL_ESSENCE_PER_ENCOUNTER_LEVEL: f64 = 1.0;

// Heroes
pub const PARTY_SIZE: usize = 3;
/// Fraction of total Health restored per tick while resting in a claimed town.
pub const TOWN_HEAL_FRACTION_PER_TICK: f64 = 0.05;
pub const TALENT_POINTS_PER_LEVEL: u32 = 1;

// Town
pub const MERCHANT_SLOTS: usize = 6;
pub const MERCHANT_RESTOCK_TICKS: u64 = 600;
/// Mana price of a merchant item per point of its salvage value.
pub const MERCHANT_PRICE_MULTIPLIER: f64 = 3.0;
/// Mana paid per unit when selling a resource at the market, before building bonuses.
pub const MARKET_BASE_RATE: f64 = 0.5;
pub const ACADEMY_XP_BONUS_PER_LEVEL: f64 = 0.05;
pub const SALVAGER_BONUS_PER_LEVEL: f64 = 0.05;
pub const MARKET_RATE_BONUS_PER_LEVEL: f64 = 0.05;
pub const MAX_BUILDING_LEVEL: u32 = 10;
/// Each building level multiplies the upgrade cost by this.
pub const BUILDING_COST_GROWTH: f64 = 1.6;
/// Merchant slots stocked at building level 0.
pub const MERCHANT_BASE_STOCK: usize = 2;

// Festivals
pub const FESTIVAL_START_CHANCE_PER_TICK: f64 = 0.0005;

// Riftglow
pub const RIFTGLOW_BONUS_PER_LEVEL: f64 = 0.05;
pub const RIFTGLOW_BASE_UPGRADE_COST: u64 = 10;
pub const RIFTGLOW_VICTORY_BASE_REWARD: u64 = 25;

// Notifications
pub const MAX_NOTIFICATIONS: usize = 50;

// Persistence
pub const SAVE_VERSION: u32 = 1;
pub const SAVE_VERSION_MAGIC: u64 = 0x5741_5946_4152_0001;
pub const SAVE_KEY: &str = "game";
