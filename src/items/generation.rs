use super::types::{EquipmentItem, EquipmentSkill, INSTANCE_ID_SEPARATOR};
use crate::content::{
    ContentRegistry, EquipmentItemContent, EquipmentSkillContent, TraitEquipmentContent,
};
use crate::core::constants::ITEM_TRAIT_CHANCE;
use crate::rng::{random_choice_by_rarity, random_uuid, succeeds_chance};
use rand::Rng;

/// Unique instance id for a content definition: `<content_id>|<uuid>`.
pub fn instance_id<R: Rng>(content_id: &str, rng: &mut R) -> String {
    format!("{content_id}{INSTANCE_ID_SEPARATOR}{}", random_uuid(rng))
}

/// Instantiates an equipment template. The instance never carries the
/// template's drop-prevention flags, and may gain one extra random trait.
pub fn equipment_create<R: Rng>(
    template: &EquipmentItemContent,
    content: &ContentRegistry,
    rng: &mut R,
) -> EquipmentItem {
    let id = instance_id(&template.id, rng);
    let mut item = EquipmentItem::from_content(template, id);

    if !template.prevent_modification && succeeds_chance(ITEM_TRAIT_CHANCE, rng) {
        if let Some(trait_id) = roll_equipment_trait(&item, content, rng) {
            item.trait_ids.push(trait_id);
        }
    }

    item
}

pub fn skill_create<R: Rng>(template: &EquipmentSkillContent, rng: &mut R) -> EquipmentSkill {
    let id = instance_id(&template.id, rng);
    EquipmentSkill::from_content(template, id)
}

fn roll_equipment_trait<R: Rng>(
    item: &EquipmentItem,
    content: &ContentRegistry,
    rng: &mut R,
) -> Option<String> {
    let candidates: Vec<&TraitEquipmentContent> = content
        .get_entries_by_type::<TraitEquipmentContent>()
        .into_iter()
        .filter(|t| !item.trait_ids.contains(&t.id))
        .collect();
    random_choice_by_rarity(&candidates, |t| t.rarity, rng).map(|t| t.id.clone())
}
