use super::constants::MAX_NOTIFICATIONS;
use super::timers::ActionClock;
use crate::currency::CurrencyBlock;
use crate::festival::FestivalState;
use crate::hero::HeroState;
use crate::items::InventoryState;
use crate::riftglow::RiftglowState;
use crate::town::TownState;
use crate::world::WorldState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
}

/// A message for the player, drained by whoever renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Bookkeeping about the save itself rather than the world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaState {
    pub game_id: String,
    pub is_setup: bool,
    pub has_won: bool,
    pub won_at_tick: Option<u64>,
    /// Unix seconds.
    pub created_at: i64,
    pub last_save_time: i64,
    /// Tick of the last checkpoint of this game.
    pub last_save_tick: u64,
    pub save_version: u32,
}

/// The whole simulation state. Created blank on reset, replaced wholesale
/// on import, mutated in place everywhere else.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub world: WorldState,
    pub hero: HeroState,
    pub inventory: InventoryState,
    pub currency: CurrencyBlock,
    pub action_clock: ActionClock,
    pub town: TownState,
    pub festival: FestivalState,
    pub riftglow: RiftglowState,
    pub meta: MetaState,
    /// Transient, never saved.
    #[serde(skip)]
    pub notifications: Vec<Notification>,
}

impl GameState {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
        self.notifications.push(Notification {
            kind,
            message: message.into(),
        });
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn now(&self) -> u64 {
        self.action_clock.num_ticks
    }
}
