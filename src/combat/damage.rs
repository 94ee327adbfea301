//! Damage and healing arithmetic.

use super::types::Combatant;
use crate::content::{GameElement, SkillTechnique};
use crate::core::constants::{DEADLOCK_ROUND_INTERVAL, DEADLOCK_STEP};

/// Grows every 25 rounds so stalemates end: 1.0, 1.25, 1.5, ...
pub fn deadlock_multiplier(rounds: u32) -> f64 {
    1.0 + DEADLOCK_STEP * (rounds / DEADLOCK_ROUND_INTERVAL) as f64
}

/// Sum of each scalar's multiplier times the attacker's effective stat.
pub fn technique_base_amount(technique: &SkillTechnique, attacker: &Combatant) -> f64 {
    technique
        .scalars
        .iter()
        .map(|s| s.multiplier * attacker.effective_stat(s.stat))
        .sum()
}

/// `Σ_e (1 + affinity[e]) * (1 - resistance[e])` over the technique's
/// elements. Non-elemental techniques use 1.0. Resistance only applies to
/// harmful techniques and is capped at 100%.
pub fn elemental_factor(elements: &[GameElement], attacker: &Combatant, target: &Combatant, harmful: bool) -> f64 {
    if elements.is_empty() {
        return 1.0;
    }
    elements
        .iter()
        .map(|e| {
            let affinity = 1.0 + attacker.affinity.get(*e);
            let resistance = if harmful {
                target.resistance.get(*e).clamp(0.0, 1.0)
            } else {
                0.0
            };
            affinity * (1.0 - resistance)
        })
        .sum()
}

/// Final amount of damage or healing, never negative.
pub fn technique_amount(
    technique: &SkillTechnique,
    attacker: &Combatant,
    target: &Combatant,
    rounds: u32,
) -> f64 {
    let harmful = !technique.heals;
    let base = technique_base_amount(technique, attacker);
    let elemental = elemental_factor(&technique.elements, attacker, target, harmful);
    let deadlock = if harmful { deadlock_multiplier(rounds) } else { 1.0 };
    (base * elemental * deadlock).max(0.0)
}
