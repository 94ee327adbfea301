use crate::content::{
    ElementBlock, EquipmentItemContent, EquipmentSkillContent, EquipmentSlot, Rarity,
    SkillTechnique, StatBlock,
};
use serde::{Deserialize, Serialize};

/// Separator between content id and uuid in instance ids.
pub const INSTANCE_ID_SEPARATOR: char = '|';

/// An owned piece of equipment. Built from an [`EquipmentItemContent`] with
/// the drop-prevention flags stripped and a unique instance id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: String,
    pub content_id: String,
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
}

impl EquipmentItem {
    /// Copies the template fields; the caller supplies the instance id.
    pub fn from_content(content: &EquipmentItemContent, id: String) -> Self {
        Self {
            id,
            content_id: content.id.clone(),
            name: content.name.clone(),
            slot: content.slot,
            rarity: content.rarity,
            drop_level: content.drop_level,
            base_stats: content.base_stats,
            element_affinity: content.element_affinity,
            element_resistance: content.element_resistance,
            trait_ids: content.trait_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSkill {
    pub id: String,
    pub content_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub drop_level: u32,
    pub techniques: Vec<SkillTechnique>,
}

impl EquipmentSkill {
    pub fn from_content(content: &EquipmentSkillContent, id: String) -> Self {
        Self {
            id,
            content_id: content.id.clone(),
            name: content.name.clone(),
            rarity: content.rarity,
            drop_level: content.drop_level,
            techniques: content.techniques.clone(),
        }
    }
}

/// Either kind of instantiated content.
#[derive(Debug, Clone, PartialEq)]
pub enum Droppable {
    Item(EquipmentItem),
    Skill(EquipmentSkill),
}

impl Droppable {
    pub fn name(&self) -> &str {
        match self {
            Droppable::Item(item) => &item.name,
            Droppable::Skill(skill) => &skill.name,
        }
    }

    pub fn rarity(&self) -> Rarity {
        match self {
            Droppable::Item(item) => item.rarity,
            Droppable::Skill(skill) => skill.rarity,
        }
    }
}

/// Unequipped instances owned by the player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryState {
    #[serde(default)]
    pub items: Vec<EquipmentItem>,
    #[serde(default)]
    pub skills: Vec<EquipmentSkill>,
}

/// Content id part of an instance id (`"<content>|<uuid>"`).
pub fn content_id_of(instance_id: &str) -> &str {
    instance_id
        .split_once(INSTANCE_ID_SEPARATOR)
        .map(|(content, _)| content)
        .unwrap_or(instance_id)
}
