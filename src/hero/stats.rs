use super::types::Hero;
use crate::content::{ContentRegistry, ElementBlock, JobContent, StatBlock, TalentContent};
use crate::items::{item_total_affinity, item_total_stats};

/// Job stats for a level: base plus growth for every level past the first.
pub fn job_base_stats(job: &JobContent, level: u32) -> StatBlock {
    let mut stats = job.base_stats;
    stats.add(&job.stats_per_level.scaled(level.saturating_sub(1) as f64));
    stats
}

/// Recomputes every derived field of a hero from base stats, equipment, and
/// talents. Running it twice changes nothing. Current hp is clamped to the
/// new maximum.
pub fn hero_recalculate_stats(hero: &mut Hero, content: &ContentRegistry) {
    let mut total = hero.base_stats;
    let mut affinity = ElementBlock::default();
    let mut resistance = ElementBlock::default();

    for item in hero.equipment.iter_equipped() {
        total.add(&item_total_stats(item, content));
        affinity.add(&item_total_affinity(item, content));
        resistance.add(&item.element_resistance);
    }

    for (talent_id, points) in &hero.talents {
        match content.get_entry::<TalentContent>(talent_id) {
            Some(talent) => {
                let points = (*points).min(talent.max_level) as f64;
                total.add(&talent.stat_boosts.scaled(points));
                affinity.add(&talent.element_boosts.scaled(points));
            }
            None => tracing::warn!("hero {} has unknown talent {talent_id}", hero.id),
        }
    }

    hero.total_stats = total;
    hero.element_affinity = affinity;
    hero.element_resistance = resistance;
    hero.hp = hero.hp.clamp(0.0, total.health.max(0.0));
}
