//! Read-only content registry.
//!
//! Loaded once at startup from JSON and shared immutably. Lookups for ids
//! that do not exist return `None`; callers skip the reference and log
//! rather than fail.

pub mod types;

pub use types::*;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The bundled content pack compiled into the binary.
const BUNDLED_CONTENT: &str = include_str!("../../content/base.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Equipment,
    Skill,
    Guardian,
    Talent,
    TraitEquipment,
    TraitLocation,
    Job,
    Festival,
    StatusEffect,
}

/// One entry of a content pack, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentEntry {
    Equipment(EquipmentItemContent),
    Skill(EquipmentSkillContent),
    Guardian(GuardianContent),
    Talent(TalentContent),
    TraitEquipment(TraitEquipmentContent),
    TraitLocation(TraitLocationContent),
    Job(JobContent),
    Festival(FestivalContent),
    StatusEffect(StatusEffectContent),
}

impl ContentEntry {
    pub fn id(&self) -> &str {
        match self {
            ContentEntry::Equipment(e) => &e.id,
            ContentEntry::Skill(e) => &e.id,
            ContentEntry::Guardian(e) => &e.id,
            ContentEntry::Talent(e) => &e.id,
            ContentEntry::TraitEquipment(e) => &e.id,
            ContentEntry::TraitLocation(e) => &e.id,
            ContentEntry::Job(e) => &e.id,
            ContentEntry::Festival(e) => &e.id,
            ContentEntry::StatusEffect(e) => &e.id,
        }
    }
}

/// A definition type that can be looked up in the registry.
pub trait ContentKind: Sized {
    const TYPE: ContentType;

    fn from_entry(entry: &ContentEntry) -> Option<&Self>;
}

macro_rules! content_kind {
    ($ty:ty, $variant:ident) => {
        impl ContentKind for $ty {
            const TYPE: ContentType = ContentType::$variant;

            fn from_entry(entry: &ContentEntry) -> Option<&Self> {
                match entry {
                    ContentEntry::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

content_kind!(EquipmentItemContent, Equipment);
content_kind!(EquipmentSkillContent, Skill);
content_kind!(GuardianContent, Guardian);
content_kind!(TalentContent, Talent);
content_kind!(TraitEquipmentContent, TraitEquipment);
content_kind!(TraitLocationContent, TraitLocation);
content_kind!(JobContent, Job);
content_kind!(FestivalContent, Festival);
content_kind!(StatusEffectContent, StatusEffect);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ContentPack {
    entries: Vec<ContentEntry>,
}

/// Immutable id → definition dictionary. Ordered so that listings by type
/// are stable, which keeps seeded draws reproducible.
#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    entries: BTreeMap<String, ContentEntry>,
}

impl ContentRegistry {
    pub fn new(entries: Vec<ContentEntry>) -> Self {
        let mut map = BTreeMap::new();
        for entry in entries {
            let id = entry.id().to_string();
            if map.insert(id.clone(), entry).is_some() {
                tracing::warn!("duplicate content id {id}, keeping the later definition");
            }
        }
        Self { entries: map }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let pack: ContentPack = serde_json::from_str(json)?;
        Ok(Self::new(pack.entries))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The content pack shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CONTENT)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_raw(&self, id: &str) -> Option<&ContentEntry> {
        self.entries.get(id)
    }

    pub fn get_entry<T: ContentKind>(&self, id: &str) -> Option<&T> {
        self.entries.get(id).and_then(T::from_entry)
    }

    /// Every entry of type `T`, ordered by id.
    pub fn get_entries_by_type<T: ContentKind>(&self) -> Vec<&T> {
        self.entries.values().filter_map(T::from_entry).collect()
    }

    pub fn count_of(&self, content_type: ContentType) -> usize {
        self.entries
            .values()
            .filter(|entry| entry_type(entry) == content_type)
            .count()
    }
}

fn entry_type(entry: &ContentEntry) -> ContentType {
    match entry {
        ContentEntry::Equipment(_) => ContentType::Equipment,
        ContentEntry::Skill(_) => ContentType::Skill,
        ContentEntry::Guardian(_) => ContentType::Guardian,
        ContentEntry::Talent(_) => ContentType::Talent,
        ContentEntry::TraitEquipment(_) => ContentType::TraitEquipment,
        ContentEntry::TraitLocation(_) => ContentType::TraitLocation,
        ContentEntry::Job(_) => ContentType::Job,
        ContentEntry::Festival(_) => ContentType::Festival,
        ContentEntry::StatusEffect(_) => ContentType::StatusEffect,
    }
}
