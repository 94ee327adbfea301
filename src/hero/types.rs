use crate::combat::Combat;
use crate::content::{ElementBlock, StatBlock, TargettingType};
use crate::items::{EquipmentSkill, HeroEquipment};
use crate::world::{Position, TravelState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How far above the party's level auto-travel is willing to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    /// Encounter levels allowed above the party level.
    pub fn level_margin(&self) -> u32 {
        match self {
            RiskTolerance::Low => 0,
            RiskTolerance::Medium => 2,
            RiskTolerance::High => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub job_id: String,
    pub level: u32,
    /// Progress towards the next level.
    #[serde(default)]
    pub xp: u64,
    pub hp: f64,
    pub base_stats: StatBlock,
    /// Derived; see [`super::hero_recalculate_stats`].
    #[serde(default)]
    pub total_stats: StatBlock,
    #[serde(default)]
    pub element_affinity: ElementBlock,
    #[serde(default)]
    pub element_resistance: ElementBlock,
    #[serde(default)]
    pub equipment: HeroEquipment,
    /// Fixed size, set from the job's `max_skills`.
    #[serde(default)]
    pub skills: Vec<Option<EquipmentSkill>>,
    /// Talent id to invested points.
    #[serde(default)]
    pub talents: BTreeMap<String, u32>,
    #[serde(default)]
    pub targetting_type: TargettingType,
}

impl Hero {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn max_hp(&self) -> f64 {
        self.total_stats.health
    }

    pub fn equipped_skills(&self) -> impl Iterator<Item = &EquipmentSkill> {
        self.skills.iter().filter_map(|s| s.as_ref())
    }
}

/// Where an exploration is and how long it has left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreState {
    pub location: String,
    pub ticks_left: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroState {
    pub heroes: Vec<Hero>,
    pub position: Position,
    pub travel: Option<TravelState>,
    pub exploring: Option<ExploreState>,
    pub combat: Option<Combat>,
    pub risk_tolerance: RiskTolerance,
    /// What the party is doing, for display.
    pub status_message: String,
}

impl HeroState {
    /// Highest hero level; 1 for an empty party.
    pub fn party_level(&self) -> u32 {
        self.heroes.iter().map(|h| h.level).max().unwrap_or(1)
    }

    pub fn any_alive(&self) -> bool {
        self.heroes.iter().any(Hero::is_alive)
    }

    pub fn is_busy(&self) -> bool {
        self.travel.is_some() || self.exploring.is_some() || self.combat.is_some()
    }

    pub fn find(&self, hero_id: &str) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.id == hero_id)
    }
}
