use super::salvage::item_salvage_value;
use super::types::{Droppable, EquipmentItem, EquipmentSkill};
use crate::content::{ContentRegistry, ElementBlock, EquipmentSlot, StatBlock, TraitEquipmentContent};
use crate::core::constants::{MAX_INVENTORY_ITEMS, MAX_INVENTORY_SKILLS};
use crate::core::game_state::GameState;
use crate::error::{GameError, Result};
use crate::hero::hero_recalculate_stats;
use serde::{Deserialize, Serialize};

/// One optional item per slot.
///
/// New slots must be `#[serde(default)]` so older saves keep loading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeroEquipment {
    #[serde(default)]
    pub accessory: Option<EquipmentItem>,
    #[serde(default)]
    pub armor: Option<EquipmentItem>,
    #[serde(default)]
    pub trinket: Option<EquipmentItem>,
    #[serde(default)]
    pub weapon: Option<EquipmentItem>,
}

impl HeroEquipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipmentSlot) -> &Option<EquipmentItem> {
        match slot {
            EquipmentSlot::Accessory => &self.accessory,
            EquipmentSlot::Armor => &self.armor,
            EquipmentSlot::Trinket => &self.trinket,
            EquipmentSlot::Weapon => &self.weapon,
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<EquipmentItem> {
        match slot {
            EquipmentSlot::Accessory => &mut self.accessory,
            EquipmentSlot::Armor => &mut self.armor,
            EquipmentSlot::Trinket => &mut self.trinket,
            EquipmentSlot::Weapon => &mut self.weapon,
        }
    }

    /// Puts `item` in `slot`, returning whatever was there.
    pub fn replace(&mut self, slot: EquipmentSlot, item: Option<EquipmentItem>) -> Option<EquipmentItem> {
        std::mem::replace(self.slot_mut(slot), item)
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = &EquipmentItem> {
        [&self.accessory, &self.armor, &self.trinket, &self.weapon]
            .into_iter()
            .filter_map(|item| item.as_ref())
    }

    pub fn iter_equipped_mut(&mut self) -> impl Iterator<Item = &mut EquipmentItem> {
        [
            &mut self.accessory,
            &mut self.armor,
            &mut self.trinket,
            &mut self.weapon,
        ]
        .into_iter()
        .filter_map(|item| item.as_mut())
    }
}

/// Base stats plus every known trait's boosts. Unknown trait ids add nothing.
pub fn item_total_stats(item: &EquipmentItem, content: &ContentRegistry) -> StatBlock {
    let mut stats = item.base_stats;
    for trait_def in item_traits(item, content) {
        stats.add(&trait_def.stat_boosts);
    }
    stats
}

pub fn item_total_affinity(item: &EquipmentItem, content: &ContentRegistry) -> ElementBlock {
    let mut affinity = item.element_affinity;
    for trait_def in item_traits(item, content) {
        affinity.add(&trait_def.element_boosts);
    }
    affinity
}

fn item_traits<'a>(
    item: &'a EquipmentItem,
    content: &'a ContentRegistry,
) -> impl Iterator<Item = &'a TraitEquipmentContent> + 'a {
    item.trait_ids
        .iter()
        .filter_map(|id| content.get_entry::<TraitEquipmentContent>(id))
}

/// Adds an item, dropping the lowest-priority item when over capacity.
pub fn inventory_add_item(state: &mut GameState, item: EquipmentItem) {
    state.inventory.items.push(item);
    if state.inventory.items.len() > MAX_INVENTORY_ITEMS {
        if let Some(index) = state
            .inventory
            .items
            .iter()
            .enumerate()
            .min_by_key(|(_, i)| (i.rarity, i.drop_level))
            .map(|(index, _)| index)
        {
            let dropped = state.inventory.items.remove(index);
            tracing::debug!("inventory full, discarded {}", dropped.id);
        }
    }
}

pub fn inventory_add_skill(state: &mut GameState, skill: EquipmentSkill) {
    state.inventory.skills.push(skill);
    if state.inventory.skills.len() > MAX_INVENTORY_SKILLS {
        if let Some(index) = state
            .inventory
            .skills
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| (s.rarity, s.drop_level))
            .map(|(index, _)| index)
        {
            let dropped = state.inventory.skills.remove(index);
            tracing::debug!("skill inventory full, discarded {}", dropped.id);
        }
    }
}

pub fn gain_droppable(state: &mut GameState, droppable: Droppable) {
    match droppable {
        Droppable::Item(item) => inventory_add_item(state, item),
        Droppable::Skill(skill) => inventory_add_skill(state, skill),
    }
}

fn hero_index(state: &GameState, hero_id: &str) -> Result<usize> {
    state
        .hero
        .heroes
        .iter()
        .position(|h| h.id == hero_id)
        .ok_or_else(|| GameError::not_found("hero", hero_id))
}

/// Moves an inventory item into the matching slot of a hero. Whatever was
/// equipped there goes back to the inventory.
pub fn hero_equip_item(
    state: &mut GameState,
    content: &ContentRegistry,
    hero_id: &str,
    item_id: &str,
) -> Result<()> {
    let hero_idx = hero_index(state, hero_id)?;
    let item_idx = state
        .inventory
        .items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| GameError::not_found("item", item_id))?;

    let item = state.inventory.items.remove(item_idx);
    let hero = &mut state.hero.heroes[hero_idx];
    let previous = hero.equipment.replace(item.slot, Some(item));
    hero_recalculate_stats(hero, content);

    if let Some(previous) = previous {
        state.inventory.items.push(previous);
    }
    Ok(())
}

pub fn hero_unequip_item(
    state: &mut GameState,
    content: &ContentRegistry,
    hero_id: &str,
    slot: EquipmentSlot,
) -> Result<()> {
    let hero_idx = hero_index(state, hero_id)?;
    if state.inventory.items.len() >= MAX_INVENTORY_ITEMS {
        return Err(GameError::Requirement("inventory is full".to_string()));
    }
    let hero = &mut state.hero.heroes[hero_idx];
    let item = hero
        .equipment
        .replace(slot, None)
        .ok_or_else(|| GameError::not_found("equipped item", format!("{slot:?}")))?;
    hero_recalculate_stats(hero, content);
    state.inventory.items.push(item);
    Ok(())
}

/// Moves an inventory skill into skill slot `slot` of a hero.
pub fn hero_equip_skill(
    state: &mut GameState,
    content: &ContentRegistry,
    hero_id: &str,
    skill_id: &str,
    slot: usize,
) -> Result<()> {
    let hero_idx = hero_index(state, hero_id)?;
    let capacity = state.hero.heroes[hero_idx].skills.len();
    if slot >= capacity {
        return Err(GameError::InvalidSlot { slot, capacity });
    }
    let skill_idx = state
        .inventory
        .skills
        .iter()
        .position(|s| s.id == skill_id)
        .ok_or_else(|| GameError::not_found("skill", skill_id))?;

    let skill = state.inventory.skills.remove(skill_idx);
    let hero = &mut state.hero.heroes[hero_idx];
    let previous = hero.skills[slot].replace(skill);
    hero_recalculate_stats(hero, content);

    if let Some(previous) = previous {
        state.inventory.skills.push(previous);
    }
    Ok(())
}

pub fn hero_unequip_skill(
    state: &mut GameState,
    content: &ContentRegistry,
    hero_id: &str,
    slot: usize,
) -> Result<()> {
    let hero_idx = hero_index(state, hero_id)?;
    if state.inventory.skills.len() >= MAX_INVENTORY_SKILLS {
        return Err(GameError::Requirement("skill inventory is full".to_string()));
    }
    let hero = &mut state.hero.heroes[hero_idx];
    let capacity = hero.skills.len();
    let skill = hero
        .skills
        .get_mut(slot)
        .ok_or(GameError::InvalidSlot { slot, capacity })?
        .take()
        .ok_or_else(|| GameError::not_found("equipped skill", slot.to_string()))?;
    hero_recalculate_stats(hero, content);
    state.inventory.skills.push(skill);
    Ok(())
}

/// Equips a freshly gained inventory item on the hero who benefits most:
/// an empty slot wins, otherwise the weakest equipped item it beats.
/// Returns true if the item was equipped.
pub fn auto_equip_if_better(state: &mut GameState, content: &ContentRegistry, item_id: &str) -> bool {
    let Some(item) = state.inventory.items.iter().find(|i| i.id == item_id) else {
        return false;
    };
    let slot = item.slot;
    let new_score = item_salvage_value(item, content);

    let mut best: Option<(usize, f64)> = None;
    for (index, hero) in state.hero.heroes.iter().enumerate() {
        let current = hero
            .equipment
            .get(slot)
            .as_ref()
            .map(|equipped| item_salvage_value(equipped, content))
            .unwrap_or(f64::NEG_INFINITY);
        if current >= new_score {
            continue;
        }
        if best.map_or(true, |(_, best_score)| current < best_score) {
            best = Some((index, current));
        }
    }

    let Some((hero_idx, _)) = best else {
        return false;
    };
    let hero_id = state.hero.heroes[hero_idx].id.clone();
    hero_equip_item(state, content, &hero_id, item_id).is_ok()
}
