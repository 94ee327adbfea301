//! Brings an imported snapshot in line with the current content pack and
//! state invariants. Every step is idempotent.

use crate::content::{ContentRegistry, EquipmentItemContent, EquipmentSkillContent, JobContent};
use crate::core::constants::{MERCHANT_SLOTS, SAVE_VERSION};
use crate::core::game_state::GameState;
use crate::hero::{hero_recalculate_stats, Hero};
use crate::items::{content_id_of, inventory_add_skill, EquipmentItem, EquipmentSkill};
use crate::world::world_recount_claims;

/// Runs every migration in order.
pub fn migrate_state(state: &mut GameState, content: &ContentRegistry) {
    let from_version = state.meta.save_version;
    migrate_items(state, content);
    migrate_skills(state, content);
    migrate_heroes(state, content);
    world_recount_claims(&mut state.world);
    state.currency.sanitize();
    state.town.merchant_slots.resize(MERCHANT_SLOTS, None);
    state.meta.save_version = SAVE_VERSION;
    if from_version != SAVE_VERSION {
        tracing::info!("migrated save from version {from_version} to {SAVE_VERSION}");
    }
}

/// Refreshes template fields from content, keeping instance ids and
/// rolled traits. Instances whose template is gone keep their stored data.
pub fn migrate_item(item: &mut EquipmentItem, content: &ContentRegistry) {
    if item.content_id.is_empty() {
        item.content_id = content_id_of(&item.id).to_string();
    }
    let Some(template) = content.get_entry::<EquipmentItemContent>(&item.content_id) else {
        tracing::warn!("item {} has no template {}, keeping stored data", item.id, item.content_id);
        return;
    };
    item.name = template.name.clone();
    item.slot = template.slot;
    item.rarity = template.rarity;
    item.drop_level = template.drop_level;
    item.base_stats = template.base_stats;
    item.element_affinity = template.element_affinity;
    item.element_resistance = template.element_resistance;
    for trait_id in &template.trait_ids {
        if !item.trait_ids.contains(trait_id) {
            item.trait_ids.push(trait_id.clone());
        }
    }
}

pub fn migrate_skill(skill: &mut EquipmentSkill, content: &ContentRegistry) {
    if skill.content_id.is_empty() {
        skill.content_id = content_id_of(&skill.id).to_string();
    }
    let Some(template) = content.get_entry::<EquipmentSkillContent>(&skill.content_id) else {
        tracing::warn!("skill {} has no template {}, keeping stored data", skill.id, skill.content_id);
        return;
    };
    skill.name = template.name.clone();
    skill.rarity = template.rarity;
    skill.drop_level = template.drop_level;
    skill.techniques = template.techniques.clone();
}

fn migrate_items(state: &mut GameState, content: &ContentRegistry) {
    for item in state.inventory.items.iter_mut() {
        migrate_item(item, content);
    }
    for hero in state.hero.heroes.iter_mut() {
        for item in hero.equipment.iter_equipped_mut() {
            migrate_item(item, content);
        }
    }
    for item in state.town.merchant_slots.iter_mut().flatten() {
        migrate_item(item, content);
    }
}

fn migrate_skills(state: &mut GameState, content: &ContentRegistry) {
    for skill in state.inventory.skills.iter_mut() {
        migrate_skill(skill, content);
    }
    for hero in state.hero.heroes.iter_mut() {
        for skill in hero.skills.iter_mut().flatten() {
            migrate_skill(skill, content);
        }
    }
}

/// Resizes skill slots to the job's count and recomputes derived stats.
/// Skills that no longer fit go back to the inventory.
fn migrate_heroes(state: &mut GameState, content: &ContentRegistry) {
    let mut displaced = Vec::new();
    for hero in state.hero.heroes.iter_mut() {
        hero.level = hero.level.max(1);
        match content.get_entry::<JobContent>(&hero.job_id) {
            Some(job) => displaced.extend(resize_skill_slots(hero, job.max_skills)),
            None => tracing::warn!("hero {} has unknown job {}", hero.id, hero.job_id),
        }
        hero_recalculate_stats(hero, content);
    }
    for skill in displaced {
        inventory_add_skill(state, skill);
    }
}

fn resize_skill_slots(hero: &mut Hero, slots: usize) -> Vec<EquipmentSkill> {
    let displaced = if hero.skills.len() > slots {
        hero.skills.split_off(slots).into_iter().flatten().collect()
    } else {
        Vec::new()
    };
    hero.skills.resize(slots, None);
    displaced
}
