use super::generation::{equipment_create, skill_create};
use super::types::Droppable;
use crate::content::{ContentRegistry, EquipmentItemContent, EquipmentSkillContent};
use crate::error::{GameError, Result};
use crate::rng::{random_choice_by_rarity, succeeds_chance};
use rand::Rng;

/// Rarity-weighted equipment template at or below `max_drop_level`.
/// Templates marked `prevent_drop` are never candidates.
///
/// An empty candidate pool is a content-authoring bug and reported as
/// [`GameError::NoEligibleContent`].
pub fn equipment_pick_random_definition<'a, R: Rng>(
    content: &'a ContentRegistry,
    max_drop_level: u32,
    rng: &mut R,
) -> Result<&'a EquipmentItemContent> {
    let candidates: Vec<&EquipmentItemContent> = content
        .get_entries_by_type::<EquipmentItemContent>()
        .into_iter()
        .filter(|e| !e.prevent_drop && e.drop_level <= max_drop_level)
        .collect();
    random_choice_by_rarity(&candidates, |e| e.rarity, rng)
        .copied()
        .ok_or(GameError::NoEligibleContent {
            kind: "equipment",
            max_drop_level,
        })
}

pub fn skill_pick_random_definition<'a, R: Rng>(
    content: &'a ContentRegistry,
    max_drop_level: u32,
    rng: &mut R,
) -> Result<&'a EquipmentSkillContent> {
    let candidates: Vec<&EquipmentSkillContent> = content
        .get_entries_by_type::<EquipmentSkillContent>()
        .into_iter()
        .filter(|e| !e.prevent_drop && e.drop_level <= max_drop_level)
        .collect();
    random_choice_by_rarity(&candidates, |e| e.rarity, rng)
        .copied()
        .ok_or(GameError::NoEligibleContent {
            kind: "skill",
            max_drop_level,
        })
}

/// Picks the content id of a random droppable for a location's claim loot.
/// Skills are chosen `skill_chance` of the time when any are eligible.
pub fn droppable_pick_random_id<R: Rng>(
    content: &ContentRegistry,
    max_drop_level: u32,
    skill_chance: f64,
    rng: &mut R,
) -> Result<String> {
    if succeeds_chance(skill_chance, rng) {
        if let Ok(skill) = skill_pick_random_definition(content, max_drop_level, rng) {
            return Ok(skill.id.clone());
        }
    }
    equipment_pick_random_definition(content, max_drop_level, rng).map(|e| e.id.clone())
}

/// Instantiates a droppable by content id. Unknown ids return `None`.
pub fn droppable_create_by_id<R: Rng>(
    content: &ContentRegistry,
    content_id: &str,
    rng: &mut R,
) -> Option<Droppable> {
    if let Some(template) = content.get_entry::<EquipmentItemContent>(content_id) {
        return Some(Droppable::Item(equipment_create(template, content, rng)));
    }
    if let Some(template) = content.get_entry::<EquipmentSkillContent>(content_id) {
        return Some(Droppable::Skill(skill_create(template, rng)));
    }
    tracing::warn!("droppable {content_id} is not in the content registry, skipping");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentEntry, EquipmentSlot, Rarity, StatBlock};
    use crate::rng::seeded_rng;

    fn item(id: &str, rarity: Rarity, drop_level: u32, prevent_drop: bool) -> ContentEntry {
        ContentEntry::Equipment(EquipmentItemContent {
            id: id.to_string(),
            name: id.to_string(),
            slot: EquipmentSlot::Trinket,
            rarity,
            drop_level,
            base_stats: StatBlock::default(),
            element_affinity: Default::default(),
            element_resistance: Default::default(),
            trait_ids: vec![],
            prevent_drop,
            prevent_modification: false,
        })
    }

    #[test]
    fn test_prevent_drop_never_chosen() {
        let content = ContentRegistry::new(vec![
            item("locked", Rarity::Common, 1, true),
            item("open", Rarity::Legendary, 1, false),
        ]);
        let mut rng = seeded_rng("prevent");
        for _ in 0..200 {
            let picked = equipment_pick_random_definition(&content, 10, &mut rng).unwrap();
            assert_eq!(picked.id, "open");
        }
    }

    #[test]
    fn test_drop_level_filter() {
        let content = ContentRegistry::new(vec![
            item("low", Rarity::Common, 1, false),
            item("high", Rarity::Common, 9, false),
        ]);
        let mut rng = seeded_rng("levels");
        for _ in 0..100 {
            let picked = equipment_pick_random_definition(&content, 5, &mut rng).unwrap();
            assert_eq!(picked.id, "low");
        }
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        let content = ContentRegistry::new(vec![item("locked", Rarity::Common, 1, true)]);
        let result = equipment_pick_random_definition(&content, 10, &mut seeded_rng("none"));
        assert!(matches!(
            result,
            Err(GameError::NoEligibleContent { kind: "equipment", .. })
        ));
        assert!(skill_pick_random_definition(&content, 10, &mut seeded_rng("none")).is_err());
    }

    #[test]
    fn test_create_by_unknown_id_is_none() {
        let content = ContentRegistry::bundled().unwrap();
        assert!(droppable_create_by_id(&content, "missing-thing", &mut seeded_rng("x")).is_none());
    }

    #[test]
    fn test_create_by_id_builds_matching_kind() {
        let content = ContentRegistry::bundled().unwrap();
        let mut rng = seeded_rng("kinds");
        match droppable_create_by_id(&content, "attack", &mut rng) {
            Some(Droppable::Skill(skill)) => assert_eq!(skill.content_id, "attack"),
            other => panic!("expected skill, got {other:?}"),
        }
    }

    #[test]
    fn test_pick_random_id_falls_back_to_equipment() {
        let content = ContentRegistry::new(vec![item("only-item", Rarity::Common, 1, false)]);
        let id = droppable_pick_random_id(&content, 5, 1.0, &mut seeded_rng("fallback")).unwrap();
        assert_eq!(id, "only-item");
    }
}
