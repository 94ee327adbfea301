//! Town buildings and the merchant's stock.

use crate::core::constants::MERCHANT_SLOTS;
use crate::currency::CurrencyBlock;
use crate::items::EquipmentItem;
use crate::world::LocationType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TownBuilding {
    Market,
    Merchant,
    Academy,
    Salvager,
}

impl TownBuilding {
    pub const ALL: [TownBuilding; 4] = [
        TownBuilding::Market,
        TownBuilding::Merchant,
        TownBuilding::Academy,
        TownBuilding::Salvager,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TownBuilding::Market => "Market",
            TownBuilding::Merchant => "Merchant",
            TownBuilding::Academy => "Academy",
            TownBuilding::Salvager => "Salvager",
        }
    }

    /// Location type whose liberation gates this building, and how many
    /// must be held for the first level.
    pub fn liberation_base(&self) -> (LocationType, u32) {
        match self {
            TownBuilding::Market => (LocationType::Village, 1),
            TownBuilding::Merchant => (LocationType::Town, 2),
            TownBuilding::Academy => (LocationType::Castle, 1),
            TownBuilding::Salvager => (LocationType::Cave, 1),
        }
    }

    /// Cost of the first level.
    pub fn base_cost(&self) -> CurrencyBlock {
        let mut cost = CurrencyBlock::new();
        match self {
            TownBuilding::Market => {
                cost.wood = 50.0;
                cost.stone = 25.0;
            }
            TownBuilding::Merchant => {
                cost.wood = 40.0;
                cost.clay = 40.0;
                cost.mana = 50.0;
            }
            TownBuilding::Academy => {
                cost.stone = 60.0;
                cost.mana = 80.0;
            }
            TownBuilding::Salvager => {
                cost.stone = 50.0;
                cost.clay = 30.0;
            }
        }
        cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownState {
    pub buildings: BTreeMap<TownBuilding, u32>,
    /// Fixed number of slots; `None` is an empty or locked slot.
    pub merchant_slots: Vec<Option<EquipmentItem>>,
    /// Ticks until the merchant restocks.
    pub merchant_restock_in: u64,
}

impl Default for TownState {
    fn default() -> Self {
        Self {
            buildings: BTreeMap::new(),
            merchant_slots: vec![None; MERCHANT_SLOTS],
            merchant_restock_in: 0,
        }
    }
}

impl TownState {
    pub fn level(&self, building: TownBuilding) -> u32 {
        self.buildings.get(&building).copied().unwrap_or(0)
    }
}
