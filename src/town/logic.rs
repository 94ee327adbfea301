//! Building upgrades, the merchant, the market, and resting in town.

use super::types::{TownBuilding, TownState};
use crate::content::ContentRegistry;
use crate::core::constants::{
    ACADEMY_XP_BONUS_PER_LEVEL, BUILDING_COST_GROWTH, MARKET_BASE_RATE,
    MARKET_RATE_BONUS_PER_LEVEL, MAX_BUILDING_LEVEL, MERCHANT_BASE_STOCK,
    MERCHANT_PRICE_MULTIPLIER, MERCHANT_RESTOCK_TICKS, MERCHANT_SLOTS,
    SALVAGER_BONUS_PER_LEVEL, TOWN_HEAL_FRACTION_PER_TICK,
};
use crate::core::game_state::{GameState, NotificationKind};
use crate::currency::{
    currency_gain, currency_has_multiple_amounts, currency_spend, currency_spend_multiple,
    CurrencyBlock, GameCurrency,
};
use crate::error::{GameError, Result};
use crate::items::{equipment_create, equipment_pick_random_definition, inventory_add_item, item_salvage_value, EquipmentItem};
use crate::world::LocationType;
use rand::Rng;

/// Locations of the gating type that must be held to reach `level + 1`.
pub fn building_liberation_required(building: TownBuilding, level: u32) -> (LocationType, u32) {
    let (node_type, base) = building.liberation_base();
    (node_type, base + level)
}

/// Currency cost of going from `level` to `level + 1`.
pub fn building_upgrade_cost(building: TownBuilding, level: u32) -> CurrencyBlock {
    building
        .base_cost()
        .scaled(BUILDING_COST_GROWTH.powi(level as i32))
}

/// Checks every gate of the next upgrade without changing anything.
pub fn town_can_upgrade(state: &GameState, building: TownBuilding) -> Result<()> {
    let level = state.town.level(building);
    if level >= MAX_BUILDING_LEVEL {
        return Err(GameError::Requirement(format!(
            "{} is at its maximum level",
            building.name()
        )));
    }
    let (node_type, required) = building_liberation_required(building, level);
    let held = state.world.claimed_count(node_type);
    if held < required {
        return Err(GameError::Requirement(format!(
            "{} needs {required} liberated {} locations, {held} held",
            building.name(),
            node_type.name()
        )));
    }
    let cost = building_upgrade_cost(building, level);
    if !currency_has_multiple_amounts(state, &cost) {
        return Err(GameError::Requirement(format!(
            "not enough resources to upgrade {}",
            building.name()
        )));
    }
    Ok(())
}

/// Pays for and applies one level. Returns the new level.
pub fn town_building_upgrade(state: &mut GameState, building: TownBuilding) -> Result<u32> {
    town_can_upgrade(state, building)?;
    let level = state.town.level(building);
    currency_spend_multiple(state, &building_upgrade_cost(building, level))?;
    let new_level = level + 1;
    state.town.buildings.insert(building, new_level);

    tracing::info!("{} upgraded to level {new_level}", building.name());
    state.notify(
        NotificationKind::Success,
        format!("{} is now level {new_level}.", building.name()),
    );
    Ok(new_level)
}

pub fn town_salvage_bonus(state: &GameState) -> f64 {
    state.town.level(TownBuilding::Salvager) as f64 * SALVAGER_BONUS_PER_LEVEL
}

pub fn town_xp_bonus(state: &GameState) -> f64 {
    state.town.level(TownBuilding::Academy) as f64 * ACADEMY_XP_BONUS_PER_LEVEL
}

/// Mana paid per unit of a resource sold at the market.
pub fn market_rate(state: &GameState) -> f64 {
    MARKET_BASE_RATE + state.town.level(TownBuilding::Market) as f64 * MARKET_RATE_BONUS_PER_LEVEL
}

/// Number of merchant slots that get stock.
pub fn merchant_active_slots(town: &TownState) -> usize {
    (MERCHANT_BASE_STOCK + town.level(TownBuilding::Merchant) as usize).min(MERCHANT_SLOTS)
}

pub fn merchant_price(item: &EquipmentItem, content: &ContentRegistry) -> f64 {
    (item_salvage_value(item, content) * MERCHANT_PRICE_MULTIPLIER).ceil()
}

/// Refills every active slot with fresh stock near the party's level.
pub fn merchant_restock<R: Rng>(state: &mut GameState, content: &ContentRegistry, rng: &mut R) {
    let max_drop_level = state.hero.party_level();
    let active = merchant_active_slots(&state.town);
    state.town.merchant_slots.resize(MERCHANT_SLOTS, None);

    for (index, slot) in state.town.merchant_slots.iter_mut().enumerate() {
        if index >= active {
            *slot = None;
            continue;
        }
        *slot = match equipment_pick_random_definition(content, max_drop_level, rng) {
            Ok(template) => Some(equipment_create(template, content, rng)),
            Err(e) => {
                tracing::warn!("merchant could not stock slot {index}: {e}");
                None
            }
        };
    }
    state.town.merchant_restock_in = MERCHANT_RESTOCK_TICKS;
    tracing::debug!("merchant restocked {active} slots");
}

/// Buys the item in `slot` for mana. Returns the bought item's id.
pub fn merchant_buy(state: &mut GameState, content: &ContentRegistry, slot: usize) -> Result<String> {
    let item = state
        .town
        .merchant_slots
        .get(slot)
        .ok_or(GameError::InvalidSlot {
            slot,
            capacity: MERCHANT_SLOTS,
        })?
        .as_ref()
        .ok_or_else(|| GameError::not_found("merchant item", format!("slot {slot}")))?;
    let price = merchant_price(item, content);
    currency_spend(state, GameCurrency::Mana, price)?;

    let Some(item) = state.town.merchant_slots[slot].take() else {
        return Err(GameError::not_found("merchant item", format!("slot {slot}")));
    };
    let id = item.id.clone();
    let name = item.name.clone();
    inventory_add_item(state, item);
    state.notify(NotificationKind::Info, format!("Bought {name} for {price:.0} mana."));
    Ok(id)
}

/// Sells `amount` of a resource for mana. Returns the mana received.
pub fn market_trade(state: &mut GameState, currency: GameCurrency, amount: f64) -> Result<f64> {
    if state.town.level(TownBuilding::Market) == 0 {
        return Err(GameError::Requirement("the market has not been built".to_string()));
    }
    if currency == GameCurrency::Mana {
        return Err(GameError::Requirement("mana cannot be sold for mana".to_string()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(GameError::Requirement("trade amount must be positive".to_string()));
    }
    currency_spend(state, currency, amount)?;
    let received = amount * market_rate(state);
    currency_gain(state, GameCurrency::Mana, received);
    Ok(received)
}

/// Whether the party stands idle in a claimed town.
pub fn party_is_resting(state: &GameState) -> bool {
    state.hero.combat.is_none()
        && state.hero.travel.is_none()
        && state
            .world
            .location_at(state.hero.position)
            .is_some_and(|l| l.currently_claimed && l.node_type.is_restful())
}

/// One tick of town upkeep: merchant countdown and healing at rest.
/// Healing brings fallen heroes back.
pub fn town_process<R: Rng>(state: &mut GameState, content: &ContentRegistry, rng: &mut R) {
    if state.town.merchant_restock_in <= 1 {
        merchant_restock(state, content, rng);
    } else {
        state.town.merchant_restock_in -= 1;
    }

    if !party_is_resting(state) {
        return;
    }
    for hero in state.hero.heroes.iter_mut() {
        let max_hp = hero.max_hp();
        if hero.hp < max_hp {
            hero.hp = (hero.hp + max_hp * TOWN_HEAL_FRACTION_PER_TICK).min(max_hp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::hero_create;
    use crate::rng::seeded_rng;
    use crate::world::{Position, WorldLocation};

    fn town_state() -> GameState {
        let mut state = GameState::blank();
        let mut home = WorldLocation::new(5, 5, LocationType::Town, "Hearthold");
        home.currently_claimed = true;
        state.world.insert_location(home);
        state.world.home = Position::new(5, 5);
        state.hero.position = Position::new(5, 5);
        state
    }

    #[test]
    fn test_cost_and_requirement_scale_with_level() {
        assert_eq!(building_upgrade_cost(TownBuilding::Market, 0).wood, 50.0);
        assert_eq!(building_upgrade_cost(TownBuilding::Market, 1).wood, 80.0);
        assert_eq!(
            building_liberation_required(TownBuilding::Merchant, 3),
            (LocationType::Town, 5)
        );
    }

    #[test]
    fn test_upgrade_needs_liberation_and_currency() {
        let mut state = town_state();
        state.currency.wood = 1000.0;
        state.currency.stone = 1000.0;
        assert!(matches!(
            town_building_upgrade(&mut state, TownBuilding::Market),
            Err(GameError::Requirement(_))
        ));
        assert_eq!(state.currency.wood, 1000.0);

        let mut village = WorldLocation::new(1, 1, LocationType::Village, "Ashby");
        village.currently_claimed = true;
        state.world.insert_location(village);
        assert_eq!(town_building_upgrade(&mut state, TownBuilding::Market).unwrap(), 1);
        assert_eq!(state.currency.wood, 950.0);
        assert_eq!(state.currency.stone, 975.0);

        // level 2 needs a second village
        assert!(town_building_upgrade(&mut state, TownBuilding::Market).is_err());
        assert_eq!(state.town.level(TownBuilding::Market), 1);
    }

    #[test]
    fn test_upgrade_without_funds_changes_nothing() {
        let mut state = town_state();
        let mut cave = WorldLocation::new(1, 1, LocationType::Cave, "Hollow");
        cave.currently_claimed = true;
        state.world.insert_location(cave);
        state.currency.stone = 500.0;
        assert!(town_building_upgrade(&mut state, TownBuilding::Salvager).is_err());
        assert_eq!(state.currency.stone, 500.0);
        assert_eq!(state.town.level(TownBuilding::Salvager), 0);
    }

    #[test]
    fn test_market_trade() {
        let mut state = town_state();
        state.currency.wood = 100.0;
        assert!(market_trade(&mut state, GameCurrency::Wood, 10.0).is_err());

        state.town.buildings.insert(TownBuilding::Market, 2);
        let received = market_trade(&mut state, GameCurrency::Wood, 40.0).unwrap();
        assert!((received - 24.0).abs() < 1e-9);
        assert_eq!(state.currency.wood, 60.0);
        assert!((state.currency.mana - 24.0).abs() < 1e-9);

        assert!(market_trade(&mut state, GameCurrency::Wood, 500.0).is_err());
        assert!(market_trade(&mut state, GameCurrency::Mana, 1.0).is_err());
    }

    #[test]
    fn test_restock_fills_active_slots_only() {
        let content = ContentRegistry::bundled().unwrap();
        let mut state = town_state();
        town_process(&mut state, &content, &mut seeded_rng("restock"));
        let stocked = state.town.merchant_slots.iter().filter(|s| s.is_some()).count();
        assert_eq!(stocked, MERCHANT_BASE_STOCK);
        assert_eq!(state.town.merchant_restock_in, MERCHANT_RESTOCK_TICKS);

        town_process(&mut state, &content, &mut seeded_rng("restock"));
        assert_eq!(state.town.merchant_restock_in, MERCHANT_RESTOCK_TICKS - 1);
    }

    #[test]
    fn test_merchant_buy_spends_mana() {
        let content = ContentRegistry::bundled().unwrap();
        let mut state = town_state();
        merchant_restock(&mut state, &content, &mut seeded_rng("shop"));
        let price = merchant_price(state.town.merchant_slots[0].as_ref().unwrap(), &content);

        assert!(merchant_buy(&mut state, &content, 0).is_err());
        state.currency.mana = price + 5.0;
        let id = merchant_buy(&mut state, &content, 0).unwrap();
        assert!(state.town.merchant_slots[0].is_none());
        assert!(state.inventory.items.iter().any(|i| i.id == id));
        assert!((state.currency.mana - 5.0).abs() < 1e-9);

        assert!(merchant_buy(&mut state, &content, 0).is_err());
        assert!(matches!(
            merchant_buy(&mut state, &content, MERCHANT_SLOTS),
            Err(GameError::InvalidSlot { .. })
        ));
    }

    #[test]
    fn test_resting_heals_and_revives() {
        let content = ContentRegistry::bundled().unwrap();
        let mut state = town_state();
        let mut hero = hero_create("hero-0", "Ayla", "warrior", &content, &mut seeded_rng("hero")).unwrap();
        hero.hp = 0.0;
        state.hero.heroes.push(hero);

        town_process(&mut state, &content, &mut seeded_rng("rest"));
        let hero = &state.hero.heroes[0];
        assert!(hero.is_alive());
        assert!((hero.hp - hero.max_hp() * TOWN_HEAL_FRACTION_PER_TICK).abs() < 1e-9);
    }

    #[test]
    fn test_no_healing_outside_town() {
        let content = ContentRegistry::bundled().unwrap();
        let mut state = town_state();
        state.hero.position = Position::new(0, 0);
        let mut hero = hero_create("hero-0", "Ayla", "warrior", &content, &mut seeded_rng("hero")).unwrap();
        hero.hp = 1.0;
        state.hero.heroes.push(hero);
        town_process(&mut state, &content, &mut seeded_rng("rest"));
        assert_eq!(state.hero.heroes[0].hp, 1.0);
    }
}
