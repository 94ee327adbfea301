//! Building combatants from guardians and heroes.

use super::types::{CombatSide, Combatant};
use crate::content::{ContentRegistry, EquipmentSkillContent, GuardianContent};
use crate::hero::Hero;
use crate::items::skill_create;
use rand::Rng;

/// A fresh guardian for one encounter, its stats grown by
/// `encounter_level * stat_scaling`. Skills missing from the registry are
/// skipped.
pub fn guardian_create<R: Rng>(
    guardian: &GuardianContent,
    content: &ContentRegistry,
    encounter_level: u32,
    index: usize,
    rng: &mut R,
) -> Combatant {
    let mut stats = guardian.base_stats;
    stats.add(&guardian.stat_scaling.scaled(encounter_level as f64));

    let skills = guardian
        .skill_ids
        .iter()
        .filter_map(|id| {
            let template = content.get_entry::<EquipmentSkillContent>(id);
            if template.is_none() {
                tracing::warn!("guardian {} lists unknown skill {id}", guardian.id);
            }
            template
        })
        .map(|template| skill_create(template, rng))
        .collect();

    let max_hp = stats.health.max(1.0);
    Combatant {
        id: format!("{}#{index}", guardian.id),
        name: guardian.name.clone(),
        side: CombatSide::Guardian,
        hp: max_hp,
        max_hp,
        stats,
        affinity: guardian.element_affinity,
        resistance: guardian.element_resistance,
        skills,
        targetting_type: guardian.targetting_type,
        status_effects: Vec::new(),
    }
}

/// Guardians for a location's guardian ids. Unknown ids are skipped.
pub fn guardians_for_location<R: Rng>(
    guardian_ids: &[String],
    content: &ContentRegistry,
    encounter_level: u32,
    rng: &mut R,
) -> Vec<Combatant> {
    guardian_ids
        .iter()
        .enumerate()
        .filter_map(|(index, id)| match content.get_entry::<GuardianContent>(id) {
            Some(guardian) => Some(guardian_create(guardian, content, encounter_level, index, rng)),
            None => {
                tracing::warn!("unknown guardian {id}, skipping");
                None
            }
        })
        .collect()
}

/// The combat view of a hero, carrying over current hp.
pub fn hero_combatant(hero: &Hero) -> Combatant {
    Combatant {
        id: hero.id.clone(),
        name: hero.name.clone(),
        side: CombatSide::Hero,
        hp: hero.hp,
        max_hp: hero.max_hp().max(1.0),
        stats: hero.total_stats,
        affinity: hero.element_affinity,
        resistance: hero.element_resistance,
        skills: hero.equipped_skills().cloned().collect(),
        targetting_type: hero.targetting_type,
        status_effects: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::StatBlock;
    use crate::rng::seeded_rng;

    fn wolf() -> GuardianContent {
        GuardianContent {
            id: "wolf".to_string(),
            name: "Wolf".to_string(),
            min_level: 1,
            base_stats: StatBlock::new(0.0, 4.0, 20.0, 5.0),
            stat_scaling: StatBlock::new(0.0, 1.0, 5.0, 0.5),
            element_affinity: Default::default(),
            element_resistance: Default::default(),
            skill_ids: vec!["attack".to_string(), "missing".to_string()],
            targetting_type: Default::default(),
        }
    }

    #[test]
    fn test_guardian_scales_with_level() {
        let content = ContentRegistry::bundled().unwrap();
        let g = guardian_create(&wolf(), &content, 4, 0, &mut seeded_rng("wolf"));
        assert_eq!(g.stats.force, 8.0);
        assert_eq!(g.stats.health, 40.0);
        assert_eq!(g.hp, 40.0);
        assert_eq!(g.max_hp, 40.0);
        assert_eq!(g.skills.len(), 1);
        assert_eq!(g.side, CombatSide::Guardian);
    }

    #[test]
    fn test_unknown_guardians_skipped() {
        let content = ContentRegistry::bundled().unwrap();
        let ids = vec!["not-a-guardian".to_string()];
        assert!(guardians_for_location(&ids, &content, 1, &mut seeded_rng("x")).is_empty());
    }
}
