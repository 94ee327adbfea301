//! Currency balances, accrual from claimed locations, and gated spending.
//!
//! Gains are always legal. Every spend goes through an availability check
//! performed in the same call as the mutation, so a balance can never be
//! driven below zero.

use crate::content::{ContentRegistry, TraitLocationContent};
use crate::core::game_state::GameState;
use crate::error::{GameError, Result};
use crate::festival::festival_currency_multiplier;
use crate::riftglow::{riftglow_bonus, RiftglowUpgrade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameCurrency {
    Mana,
    Food,
    Wood,
    Stone,
    Clay,
    SoulEssence,
}

impl GameCurrency {
    pub fn all() -> [GameCurrency; 6] {
        [
            GameCurrency::Mana,
            GameCurrency::Food,
            GameCurrency::Wood,
            GameCurrency::Stone,
            GameCurrency::Clay,
            GameCurrency::SoulEssence,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameCurrency::Mana => "Mana",
            GameCurrency::Food => "Food",
            GameCurrency::Wood => "Wood",
            GameCurrency::Stone => "Stone",
            GameCurrency::Clay => "Clay",
            GameCurrency::SoulEssence => "Soul Essence",
        }
    }
}

/// One amount per [`GameCurrency`]. Missing fields deserialize to zero so
/// saves written before a currency existed still load.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyBlock {
    pub mana: f64,
    pub food: f64,
    pub wood: f64,
    pub stone: f64,
    pub clay: f64,
    pub soul_essence: f64,
}

impl CurrencyBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block holding a single non-zero amount.
    pub fn of(currency: GameCurrency, amount: f64) -> Self {
        let mut block = Self::new();
        block.set(currency, amount);
        block
    }

    pub fn get(&self, currency: GameCurrency) -> f64 {
        match currency {
            GameCurrency::Mana => self.mana,
            GameCurrency::Food => self.food,
            GameCurrency::Wood => self.wood,
            GameCurrency::Stone => self.stone,
            GameCurrency::Clay => self.clay,
            GameCurrency::SoulEssence => self.soul_essence,
        }
    }

    pub fn set(&mut self, currency: GameCurrency, amount: f64) {
        let slot = match currency {
            GameCurrency::Mana => &mut self.mana,
            GameCurrency::Food => &mut self.food,
            GameCurrency::Wood => &mut self.wood,
            GameCurrency::Stone => &mut self.stone,
            GameCurrency::Clay => &mut self.clay,
            GameCurrency::SoulEssence => &mut self.soul_essence,
        };
        *slot = amount;
    }

    pub fn add(&mut self, currency: GameCurrency, amount: f64) {
        self.set(currency, self.get(currency) + amount);
    }

    pub fn add_block(&mut self, other: &CurrencyBlock) {
        for (currency, amount) in other.iter() {
            self.add(currency, amount);
        }
    }

    pub fn scaled(&self, factor: f64) -> CurrencyBlock {
        let mut block = *self;
        for currency in GameCurrency::all() {
            block.set(currency, self.get(currency) * factor);
        }
        block
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameCurrency, f64)> + '_ {
        GameCurrency::all().into_iter().map(|c| (c, self.get(c)))
    }

    /// Non-zero entries only, for cost display and gating.
    pub fn nonzero(&self) -> impl Iterator<Item = (GameCurrency, f64)> + '_ {
        self.iter().filter(|(_, amount)| *amount != 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.nonzero().next().is_none()
    }

    /// Clamp every balance to be non-negative and finite (used by save migration).
    pub fn sanitize(&mut self) {
        for currency in GameCurrency::all() {
            let value = self.get(currency);
            if !value.is_finite() || value < 0.0 {
                self.set(currency, 0.0);
            }
        }
    }
}

pub fn currency_gain(state: &mut GameState, currency: GameCurrency, amount: f64) {
    if amount <= 0.0 || !amount.is_finite() {
        return;
    }
    state.currency.add(currency, amount);
}

pub fn currency_gain_multiple(state: &mut GameState, amounts: &CurrencyBlock) {
    for (currency, amount) in amounts.nonzero() {
        currency_gain(state, currency, amount);
    }
}

pub fn currency_has_amount(state: &GameState, currency: GameCurrency, amount: f64) -> bool {
    state.currency.get(currency) >= amount
}

pub fn currency_has_multiple_amounts(state: &GameState, amounts: &CurrencyBlock) -> bool {
    amounts
        .nonzero()
        .all(|(currency, amount)| currency_has_amount(state, currency, amount))
}

/// Removes currency without checking. Balances saturate at zero; callers
/// are expected to have gated on [`currency_has_amount`] first.
pub fn currency_lose(state: &mut GameState, currency: GameCurrency, amount: f64) {
    let remaining = (state.currency.get(currency) - amount).max(0.0);
    state.currency.set(currency, remaining);
}

fn check_spend_amount(currency: GameCurrency, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(GameError::InvalidAmount { currency, amount });
    }
    Ok(())
}

/// Checks and spends in one step. Negative or non-finite amounts are
/// rejected so a spend can never credit a balance.
pub fn currency_spend(state: &mut GameState, currency: GameCurrency, amount: f64) -> Result<()> {
    check_spend_amount(currency, amount)?;
    if !currency_has_amount(state, currency, amount) {
        return Err(GameError::InsufficientCurrency {
            currency,
            needed: amount,
            available: state.currency.get(currency),
        });
    }
    currency_lose(state, currency, amount);
    Ok(())
}

/// Spends every entry of `costs` or nothing at all.
pub fn currency_spend_multiple(state: &mut GameState, costs: &CurrencyBlock) -> Result<()> {
    for (currency, amount) in costs.nonzero() {
        check_spend_amount(currency, amount)?;
    }
    if let Some((currency, needed)) = costs
        .nonzero()
        .find(|(currency, amount)| !currency_has_amount(state, *currency, *amount))
    {
        return Err(GameError::InsufficientCurrency {
            currency,
            needed,
            available: state.currency.get(currency),
        });
    }
    for (currency, amount) in costs.nonzero() {
        currency_lose(state, currency, amount);
    }
    Ok(())
}

/// Currency produced per tick by every currently claimed location, with
/// location traits, active festivals, and riftglow applied.
pub fn currency_claims_per_tick(state: &GameState, content: &ContentRegistry) -> CurrencyBlock {
    let mut total = CurrencyBlock::new();

    for location in state.world.locations.values() {
        if !location.currently_claimed {
            continue;
        }
        let trait_modifier: f64 = location
            .trait_ids
            .iter()
            .filter_map(|id| content.get_entry::<TraitLocationContent>(id))
            .map(|t| t.currency_modifier)
            .sum();
        let production = location.node_type.currency_production();
        total.add_block(&production.scaled((1.0 + trait_modifier).max(0.0)));
    }

    let riftglow_multiplier = 1.0 + riftglow_bonus(state, RiftglowUpgrade::CurrencyBoost);
    for currency in GameCurrency::all() {
        let festival_multiplier = festival_currency_multiplier(state, content, currency);
        total.set(
            currency,
            total.get(currency) * festival_multiplier * riftglow_multiplier,
        );
    }

    total
}

/// Applies `ticks` worth of claim production. Returns what was gained.
pub fn currency_accrue(state: &mut GameState, content: &ContentRegistry, ticks: u64) -> CurrencyBlock {
    let gained = currency_claims_per_tick(state, content).scaled(ticks as f64);
    currency_gain_multiple(state, &gained);
    gained
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(currency: GameCurrency, amount: f64) -> GameState {
        let mut state = GameState::blank();
        state.currency.set(currency, amount);
        state
    }

    #[test]
    fn test_gain_is_additive() {
        let mut state = GameState::blank();
        currency_gain(&mut state, GameCurrency::Mana, 10.0);
        currency_gain(&mut state, GameCurrency::Mana, 5.5);
        assert!((state.currency.mana - 15.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gain_ignores_negative_amounts() {
        let mut state = state_with(GameCurrency::Food, 3.0);
        currency_gain(&mut state, GameCurrency::Food, -10.0);
        assert_eq!(state.currency.food, 3.0);
    }

    #[test]
    fn test_spend_rejects_negative_and_nan() {
        let mut state = state_with(GameCurrency::Stone, 10.0);
        assert!(matches!(
            currency_spend(&mut state, GameCurrency::Stone, -5.0),
            Err(GameError::InvalidAmount { .. })
        ));
        assert!(matches!(
            currency_spend(&mut state, GameCurrency::Stone, f64::NAN),
            Err(GameError::InvalidAmount { .. })
        ));
        assert_eq!(state.currency.stone, 10.0);

        let mut costs = CurrencyBlock::new();
        costs.set(GameCurrency::Stone, 2.0);
        costs.set(GameCurrency::Wood, -3.0);
        assert!(matches!(
            currency_spend_multiple(&mut state, &costs),
            Err(GameError::InvalidAmount { .. })
        ));
        assert_eq!(state.currency.stone, 10.0);
        assert_eq!(state.currency.wood, 0.0);
    }

    #[test]
    fn test_spend_rejects_when_insufficient() {
        let mut state = state_with(GameCurrency::Wood, 4.0);
        let result = currency_spend(&mut state, GameCurrency::Wood, 5.0);
        assert!(matches!(
            result,
            Err(GameError::InsufficientCurrency { currency: GameCurrency::Wood, .. })
        ));
        assert_eq!(state.currency.wood, 4.0);
    }

    #[test]
    fn test_spend_exact_balance_reaches_zero() {
        let mut state = state_with(GameCurrency::Stone, 7.0);
        currency_spend(&mut state, GameCurrency::Stone, 7.0).unwrap();
        assert_eq!(state.currency.stone, 0.0);
    }

    #[test]
    fn test_spend_multiple_is_all_or_nothing() {
        let mut state = GameState::blank();
        state.currency.mana = 100.0;
        state.currency.clay = 1.0;

        let mut costs = CurrencyBlock::new();
        costs.mana = 50.0;
        costs.clay = 2.0;

        assert!(!currency_has_multiple_amounts(&state, &costs));
        assert!(currency_spend_multiple(&mut state, &costs).is_err());
        assert_eq!(state.currency.mana, 100.0);
        assert_eq!(state.currency.clay, 1.0);

        state.currency.clay = 2.0;
        currency_spend_multiple(&mut state, &costs).unwrap();
        assert_eq!(state.currency.mana, 50.0);
        assert_eq!(state.currency.clay, 0.0);
    }

    #[test]
    fn test_lose_saturates_at_zero() {
        let mut state = state_with(GameCurrency::SoulEssence, 1.0);
        currency_lose(&mut state, GameCurrency::SoulEssence, 5.0);
        assert_eq!(state.currency.soul_essence, 0.0);
    }

    #[test]
    fn test_balances_never_negative_under_gated_spends() {
        let mut state = GameState::blank();
        let ops: [(bool, f64); 8] = [
            (true, 10.0),
            (false, 4.0),
            (false, 8.0),
            (true, 1.5),
            (false, 7.5),
            (false, 0.5),
            (true, 2.0),
            (false, 3.0),
        ];
        for (is_gain, amount) in ops {
            if is_gain {
                currency_gain(&mut state, GameCurrency::Mana, amount);
            } else {
                let _ = currency_spend(&mut state, GameCurrency::Mana, amount);
            }
            assert!(state.currency.mana >= 0.0);
        }
    }

    #[test]
    fn test_block_partial_json_defaults_missing_fields() {
        let block: CurrencyBlock = serde_json::from_str(r#"{"mana": 12.0}"#).unwrap();
        assert_eq!(block.mana, 12.0);
        assert_eq!(block.soul_essence, 0.0);
    }

    #[test]
    fn test_sanitize_clears_negative_and_nan() {
        let mut block = CurrencyBlock::new();
        block.food = -3.0;
        block.wood = f64::NAN;
        block.mana = 2.0;
        block.sanitize();
        assert_eq!(block.food, 0.0);
        assert_eq!(block.wood, 0.0);
        assert_eq!(block.mana, 2.0);
    }
}
