use crate::content::{ElementBlock, GameStat, StatBlock, StatusEffectKind, TargettingType};
use crate::core::constants::MAX_COMBAT_LOG_LINES;
use crate::items::EquipmentSkill;
use crate::world::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatSide {
    Hero,
    Guardian,
}

impl CombatSide {
    pub fn opponent(&self) -> CombatSide {
        match self {
            CombatSide::Hero => CombatSide::Guardian,
            CombatSide::Guardian => CombatSide::Hero,
        }
    }
}

/// A status effect applied to one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStatusEffect {
    pub status_effect_id: String,
    pub name: String,
    pub kind: StatusEffectKind,
    pub value: f64,
    #[serde(default)]
    pub stat: Option<GameStat>,
    pub turns_left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub side: CombatSide,
    pub hp: f64,
    pub max_hp: f64,
    pub stats: StatBlock,
    #[serde(default)]
    pub affinity: ElementBlock,
    #[serde(default)]
    pub resistance: ElementBlock,
    #[serde(default)]
    pub skills: Vec<EquipmentSkill>,
    #[serde(default)]
    pub targetting_type: TargettingType,
    #[serde(default)]
    pub status_effects: Vec<ActiveStatusEffect>,
}

impl Combatant {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Stat after buffs and debuffs, never negative.
    pub fn effective_stat(&self, stat: GameStat) -> f64 {
        let modifier: f64 = self
            .status_effects
            .iter()
            .filter(|e| e.stat == Some(stat))
            .map(|e| match e.kind {
                StatusEffectKind::Buff => e.value,
                StatusEffectKind::Debuff => -e.value,
                _ => 0.0,
            })
            .sum();
        (self.stats.get(stat) * (1.0 + modifier)).max(0.0)
    }

    pub fn is_stunned(&self) -> bool {
        self.status_effects
            .iter()
            .any(|e| e.kind == StatusEffectKind::Stun)
    }

    pub fn take_damage(&mut self, amount: f64) {
        self.hp = (self.hp - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f64) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Ongoing,
    Victory,
    Defeat,
}

/// An encounter at an unclaimed location. Exists only while the party is
/// fighting its guardians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combat {
    pub id: String,
    pub location_id: String,
    pub location_name: String,
    pub location: Position,
    pub rounds: u32,
    pub heroes: Vec<Combatant>,
    pub guardians: Vec<Combatant>,
    #[serde(default)]
    pub log: Vec<String>,
}

impl Combat {
    pub fn side(&self, side: CombatSide) -> &[Combatant] {
        match side {
            CombatSide::Hero => &self.heroes,
            CombatSide::Guardian => &self.guardians,
        }
    }

    pub fn side_mut(&mut self, side: CombatSide) -> &mut Vec<Combatant> {
        match side {
            CombatSide::Hero => &mut self.heroes,
            CombatSide::Guardian => &mut self.guardians,
        }
    }

    pub fn outcome(&self) -> CombatOutcome {
        if !self.guardians.iter().any(Combatant::is_alive) {
            CombatOutcome::Victory
        } else if !self.heroes.iter().any(Combatant::is_alive) {
            CombatOutcome::Defeat
        } else {
            CombatOutcome::Ongoing
        }
    }

    /// Appends a line, dropping the oldest once the log is full.
    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.log.len() >= MAX_COMBAT_LOG_LINES {
            self.log.remove(0);
        }
        self.log.push(line.into());
    }
}
