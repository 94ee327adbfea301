//! Experience, levels, and talent points.

use super::stats::{hero_recalculate_stats, job_base_stats};
use super::types::Hero;
use crate::content::{ContentRegistry, JobContent, TalentContent};
use crate::core::constants::TALENT_POINTS_PER_LEVEL;
use crate::core::game_state::{GameState, NotificationKind};
use crate::error::{GameError, Result};
use crate::festival::festival_xp_multiplier;
use crate::riftglow::{riftglow_bonus, RiftglowUpgrade};
use crate::town::town_xp_bonus;

/// XP needed to go from `level` to `level + 1`: `10 * (level + 1)^2`.
pub fn xp_required_for_level(level: u32) -> u64 {
    let next = level as u64 + 1;
    10 * next * next
}

/// Adds XP and applies any level-ups. Base stats follow the job; a missing
/// job leaves them as they are. Returns the number of levels gained.
pub fn hero_gain_xp(hero: &mut Hero, content: &ContentRegistry, amount: u64) -> u32 {
    hero.xp += amount;
    let mut gained = 0;
    while hero.xp >= xp_required_for_level(hero.level) {
        hero.xp -= xp_required_for_level(hero.level);
        hero.level += 1;
        gained += 1;
    }

    if gained > 0 {
        match content.get_entry::<JobContent>(&hero.job_id) {
            Some(job) => hero.base_stats = job_base_stats(job, hero.level),
            None => tracing::warn!("hero {} has unknown job {}", hero.id, hero.job_id),
        }
        let was_alive = hero.is_alive();
        hero_recalculate_stats(hero, content);
        // Level-ups restore the living to full health.
        if was_alive {
            hero.hp = hero.max_hp();
        }
    }
    gained
}

/// Every XP multiplier that applies to the party right now.
pub fn party_xp_multiplier(state: &GameState, content: &ContentRegistry) -> f64 {
    festival_xp_multiplier(state, content)
        * (1.0 + town_xp_bonus(state) + riftglow_bonus(state, RiftglowUpgrade::XpBoost))
}

/// Gives every living hero `amount` XP with multipliers applied.
pub fn party_gain_xp(state: &mut GameState, content: &ContentRegistry, amount: u64) {
    let scaled = (amount as f64 * party_xp_multiplier(state, content)).round() as u64;
    let mut level_ups = Vec::new();
    for hero in state.hero.heroes.iter_mut().filter(|h| h.is_alive()) {
        if hero_gain_xp(hero, content, scaled) > 0 {
            level_ups.push(format!("{} reached level {}!", hero.name, hero.level));
        }
    }
    for message in level_ups {
        state.notify(NotificationKind::Success, message);
    }
}

pub fn talent_points_spent(hero: &Hero) -> u32 {
    hero.talents.values().sum()
}

pub fn talent_points_available(hero: &Hero) -> u32 {
    (hero.level.saturating_sub(1) * TALENT_POINTS_PER_LEVEL).saturating_sub(talent_points_spent(hero))
}

/// Invests one point in a talent. Returns the talent's new level.
pub fn hero_allocate_talent(
    state: &mut GameState,
    content: &ContentRegistry,
    hero_id: &str,
    talent_id: &str,
) -> Result<u32> {
    let talent = content
        .get_entry::<TalentContent>(talent_id)
        .ok_or_else(|| GameError::ContentNotFound(talent_id.to_string()))?;
    let hero = state
        .hero
        .heroes
        .iter_mut()
        .find(|h| h.id == hero_id)
        .ok_or_else(|| GameError::not_found("hero", hero_id))?;

    if talent_points_available(hero) == 0 {
        return Err(GameError::Requirement(format!(
            "{} has no talent points to spend",
            hero.name
        )));
    }
    let current = hero.talents.get(talent_id).copied().unwrap_or(0);
    if current >= talent.max_level {
        return Err(GameError::Requirement(format!(
            "{} is already at max level",
            talent.name
        )));
    }

    hero.talents.insert(talent_id.to_string(), current + 1);
    hero_recalculate_stats(hero, content);
    Ok(current + 1)
}
