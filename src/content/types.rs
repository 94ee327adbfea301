//! Static content definitions.
//!
//! These are the immutable templates the registry hands out. Runtime
//! instances (owned items, skills, combatants) are built from them and never
//! write back.

use crate::currency::GameCurrency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mystical,
    Legendary,
    Unique,
}

impl Rarity {
    pub fn all() -> [Rarity; 6] {
        [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Mystical,
            Rarity::Legendary,
            Rarity::Unique,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Mystical => "Mystical",
            Rarity::Legendary => "Legendary",
            Rarity::Unique => "Unique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameStat {
    Aura,
    Force,
    Health,
    Speed,
}

impl GameStat {
    pub fn all() -> [GameStat; 4] {
        [GameStat::Aura, GameStat::Force, GameStat::Health, GameStat::Speed]
    }
}

/// A value per [`GameStat`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StatBlock {
    pub aura: f64,
    pub force: f64,
    pub health: f64,
    pub speed: f64,
}

impl StatBlock {
    pub fn new(aura: f64, force: f64, health: f64, speed: f64) -> Self {
        Self {
            aura,
            force,
            health,
            speed,
        }
    }

    pub fn get(&self, stat: GameStat) -> f64 {
        match stat {
            GameStat::Aura => self.aura,
            GameStat::Force => self.force,
            GameStat::Health => self.health,
            GameStat::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: GameStat, value: f64) {
        match stat {
            GameStat::Aura => self.aura = value,
            GameStat::Force => self.force = value,
            GameStat::Health => self.health = value,
            GameStat::Speed => self.speed = value,
        }
    }

    pub fn add(&mut self, other: &StatBlock) {
        for stat in GameStat::all() {
            self.set(stat, self.get(stat) + other.get(stat));
        }
    }

    pub fn scaled(&self, factor: f64) -> StatBlock {
        let mut block = StatBlock::default();
        for stat in GameStat::all() {
            block.set(stat, self.get(stat) * factor);
        }
        block
    }

    pub fn total(&self) -> f64 {
        GameStat::all().iter().map(|s| self.get(*s)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameElement {
    Air,
    Earth,
    Fire,
    Water,
}

impl GameElement {
    pub fn all() -> [GameElement; 4] {
        [
            GameElement::Air,
            GameElement::Earth,
            GameElement::Fire,
            GameElement::Water,
        ]
    }
}

/// A value per [`GameElement`]; used both for affinities and resistances.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ElementBlock {
    pub air: f64,
    pub earth: f64,
    pub fire: f64,
    pub water: f64,
}

impl ElementBlock {
    pub fn get(&self, element: GameElement) -> f64 {
        match element {
            GameElement::Air => self.air,
            GameElement::Earth => self.earth,
            GameElement::Fire => self.fire,
            GameElement::Water => self.water,
        }
    }

    pub fn set(&mut self, element: GameElement, value: f64) {
        match element {
            GameElement::Air => self.air = value,
            GameElement::Earth => self.earth = value,
            GameElement::Fire => self.fire = value,
            GameElement::Water => self.water = value,
        }
    }

    pub fn add(&mut self, other: &ElementBlock) {
        for element in GameElement::all() {
            self.set(element, self.get(element) + other.get(element));
        }
    }

    pub fn scaled(&self, factor: f64) -> ElementBlock {
        let mut block = ElementBlock::default();
        for element in GameElement::all() {
            block.set(element, self.get(element) * factor);
        }
        block
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Accessory,
    Armor,
    Trinket,
    Weapon,
}

impl EquipmentSlot {
    pub fn all() -> [EquipmentSlot; 4] {
        [
            EquipmentSlot::Accessory,
            EquipmentSlot::Armor,
            EquipmentSlot::Trinket,
            EquipmentSlot::Weapon,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargettingType {
    #[default]
    Random,
    Strongest,
    Weakest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItemContent {
    pub id: String,
    pub name: String,
    pub slot: EquipmentSlot,
    pub rarity: Rarity,
    pub drop_level: u32,
    #[serde(default)]
    pub base_stats: StatBlock,
    #[serde(default)]
    pub element_affinity: ElementBlock,
    #[serde(default)]
    pub element_resistance: ElementBlock,
    #[serde(default)]
    pub trait_ids: Vec<String>,
    #[serde(default)]
    pub prevent_drop: bool,
    #[serde(default)]
    pub prevent_modification: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechniqueTarget {
    Enemy,
    Ally,
    #[serde(rename = "Self")]
    Itself,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueScalar {
    pub stat: GameStat,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueStatusEffect {
    pub status_effect_id: String,
    #[serde(default = "always")]
    pub chance: f64,
    pub duration: u32,
}

fn always() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTechnique {
    pub targets: u32,
    pub target_type: TechniqueTarget,
    #[serde(default)]
    pub elements: Vec<GameElement>,
    #[serde(default)]
    pub scalars: Vec<TechniqueScalar>,
    /// Positive amounts restore hp instead of removing it.
    #[serde(default)]
    pub heals: bool,
    #[serde(default)]
    pub status_effects: Vec<TechniqueStatusEffect>,
    /// Log template; `{combatant}`, `{target}` and `{amount}` are substituted.
    #[serde(default)]
    pub combat_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSkillContent {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub drop_level: u32,
    pub techniques: Vec<SkillTechnique>,
    #[serde(default)]
    pub prevent_drop: bool,
    #[serde(default)]
    pub prevent_modification: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardianContent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub min_level: u32,
    pub base_stats: StatBlock,
    /// Added once per encounter level.
    #[serde(default)]
    pub stat_scaling: StatBlock,
    #[serde(default)]
    pub element_affinity: ElementBlock,
    #[serde(default)]
    pub element_resistance: ElementBlock,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    #[serde(default)]
    pub targetting_type: TargettingType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentContent {
    pub id: String,
    pub name: String,
    pub max_level: u32,
    /// Granted per invested point.
    #[serde(default)]
    pub stat_boosts: StatBlock,
    #[serde(default)]
    pub element_boosts: ElementBlock,
    /// Fractional salvage bonus per invested point (0.05 = +5%).
    #[serde(default)]
    pub salvage_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitEquipmentContent {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub stat_boosts: StatBlock,
    #[serde(default)]
    pub element_boosts: ElementBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitLocationContent {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    /// Fractional change to travel time towards the location (0.25 = 25% slower).
    #[serde(default)]
    pub travel_time_modifier: f64,
    #[serde(default)]
    pub encounter_level_modifier: i32,
    #[serde(default)]
    pub currency_modifier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContent {
    pub id: String,
    pub name: String,
    pub base_stats: StatBlock,
    pub stats_per_level: StatBlock,
    pub max_skills: usize,
    #[serde(default)]
    pub starting_skill_ids: Vec<String>,
    #[serde(default)]
    pub targetting_type: TargettingType,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FestivalEffects {
    #[serde(default)]
    pub currency_multipliers: BTreeMap<GameCurrency, f64>,
    /// Fractional change to travel duration (-0.2 = 20% faster).
    #[serde(default)]
    pub travel_time_modifier: f64,
    #[serde(default)]
    pub xp_modifier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalContent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: u64,
    #[serde(default)]
    pub effects: FestivalEffects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffectKind {
    Stun,
    DamageOverTime,
    HealOverTime,
    Buff,
    Debuff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectContent {
    pub id: String,
    pub name: String,
    pub kind: StatusEffectKind,
    /// Fraction of max Health for damage/heal over time, fraction of the
    /// stat for buffs and debuffs.
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub stat: Option<GameStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_ordering() {
        assert!(Rarity::Common < Rarity::Uncommon);
        assert!(Rarity::Legendary < Rarity::Unique);
    }

    #[test]
    fn test_stat_block_uses_pascal_case_keys() {
        let stats: StatBlock = serde_json::from_str(r#"{"Aura": 1, "Speed": 4}"#).unwrap();
        assert_eq!(stats.aura, 1.0);
        assert_eq!(stats.force, 0.0);
        assert_eq!(stats.speed, 4.0);
    }

    #[test]
    fn test_stat_block_add_and_scale() {
        let mut a = StatBlock::new(1.0, 2.0, 3.0, 4.0);
        a.add(&StatBlock::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(a, StatBlock::new(2.0, 3.0, 4.0, 5.0));
        assert_eq!(a.scaled(2.0).total(), 28.0);
    }

    #[test]
    fn test_technique_self_target_name() {
        let target: TechniqueTarget = serde_json::from_str(r#""Self""#).unwrap();
        assert_eq!(target, TechniqueTarget::Itself);
    }

    #[test]
    fn test_status_effect_chance_defaults_to_certain() {
        let effect: TechniqueStatusEffect =
            serde_json::from_str(r#"{"status_effect_id": "burn", "duration": 2}"#).unwrap();
        assert_eq!(effect.chance, 1.0);
    }
}
