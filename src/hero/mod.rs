//! Heroes: creation from a job, derived stats, and progression.

pub mod progression;
pub mod stats;
pub mod types;

pub use progression::*;
pub use stats::*;
pub use types::*;

use crate::content::{ContentRegistry, EquipmentSkillContent, JobContent};
use crate::error::{GameError, Result};
use crate::items::{skill_create, HeroEquipment};
use rand::Rng;
use std::collections::BTreeMap;

/// Builds a level 1 hero for `job_id` at full health. Starting skills that
/// are missing from the registry are skipped; extras beyond the job's slot
/// count are dropped.
pub fn hero_create<R: Rng>(
    id: &str,
    name: &str,
    job_id: &str,
    content: &ContentRegistry,
    rng: &mut R,
) -> Result<Hero> {
    let job = content
        .get_entry::<JobContent>(job_id)
        .ok_or_else(|| GameError::ContentNotFound(job_id.to_string()))?;

    let mut skills = vec![None; job.max_skills];
    let starting = job
        .starting_skill_ids
        .iter()
        .filter_map(|skill_id| {
            let template = content.get_entry::<EquipmentSkillContent>(skill_id);
            if template.is_none() {
                tracing::warn!("job {job_id} lists unknown starting skill {skill_id}");
            }
            template
        })
        .take(job.max_skills);
    for (slot, template) in starting.enumerate() {
        skills[slot] = Some(skill_create(template, rng));
    }

    let mut hero = Hero {
        id: id.to_string(),
        name: name.to_string(),
        job_id: job.id.clone(),
        level: 1,
        xp: 0,
        hp: 0.0,
        base_stats: job_base_stats(job, 1),
        total_stats: Default::default(),
        element_affinity: Default::default(),
        element_resistance: Default::default(),
        equipment: HeroEquipment::new(),
        skills,
        talents: BTreeMap::new(),
        targetting_type: job.targetting_type,
    };
    hero_recalculate_stats(&mut hero, content);
    hero.hp = hero.max_hp();
    Ok(hero)
}
