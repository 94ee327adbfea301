//! The single owner of the live [`GameState`].
//!
//! Everything that changes the state goes through [`GameStore::update`], so
//! subscribers see every mutation and there is exactly one writer.
//! Persistence is delegated to an injected [`PersistenceAdapter`].

use super::constants::SAVE_KEY;
use super::game_state::GameState;
use crate::content::ContentRegistry;
use crate::error::Result;
use crate::save::{export_state, import_state};
use chrono::Utc;
use std::collections::HashMap;

/// Key/value storage for serialized saves.
pub trait PersistenceAdapter {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, data: &str) -> Result<()>;
}

/// Keeps saves in memory. Used by tests and the simulator.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    entries: HashMap<String, String>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, data: &str) -> Result<()> {
        self.entries.insert(key.to_string(), data.to_string());
        Ok(())
    }
}

pub type Subscriber = Box<dyn FnMut(&GameState)>;

pub struct GameStore {
    state: GameState,
    adapter: Box<dyn PersistenceAdapter>,
    subscribers: Vec<Subscriber>,
    loaded: bool,
}

impl GameStore {
    pub fn new(adapter: Box<dyn PersistenceAdapter>) -> Self {
        Self {
            state: GameState::blank(),
            adapter,
            subscribers: Vec::new(),
            loaded: false,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryAdapter::new()))
    }

    pub fn get(&self) -> &GameState {
        &self.state
    }

    /// Runs `f` against the state, then notifies subscribers.
    pub fn update<T>(&mut self, f: impl FnOnce(&mut GameState) -> T) -> T {
        let out = f(&mut self.state);
        self.publish();
        out
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GameState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Swaps in a whole new state, e.g. after setup or a worker merge.
    pub fn replace(&mut self, state: GameState) {
        self.state = state;
        self.loaded = true;
        self.publish();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Loads the saved game if there is one. Returns whether a save existed;
    /// without one the store holds a blank state.
    pub fn load(&mut self, content: &ContentRegistry) -> Result<bool> {
        let found = match self.adapter.load(SAVE_KEY)? {
            Some(json) => {
                self.state = import_state(&json, content)?;
                true
            }
            None => {
                self.state = GameState::blank();
                false
            }
        };
        self.loaded = true;
        tracing::debug!("store loaded (save found: {found})");
        self.publish();
        Ok(found)
    }

    pub fn save(&mut self) -> Result<()> {
        self.state.meta.last_save_time = Utc::now().timestamp();
        self.state.meta.last_save_tick = self.state.now();
        let json = export_state(&self.state)?;
        self.adapter.save(SAVE_KEY, &json)?;
        tracing::debug!("saved at tick {}", self.state.now());
        Ok(())
    }

    fn publish(&mut self) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_update_notifies_subscribers() {
        let mut store = GameStore::in_memory();
        let seen = Rc::new(Cell::new(0u64));
        let seen_by_sub = Rc::clone(&seen);
        store.subscribe(move |state| seen_by_sub.set(state.now()));

        store.update(|state| state.action_clock.num_ticks = 12);
        assert_eq!(seen.get(), 12);
    }

    #[test]
    fn test_load_without_save_is_blank_but_loaded() {
        let content = ContentRegistry::bundled().unwrap();
        let mut store = GameStore::in_memory();
        assert!(!store.is_loaded());
        assert!(!store.load(&content).unwrap());
        assert!(store.is_loaded());
        assert!(!store.get().meta.is_setup);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let content = ContentRegistry::bundled().unwrap();
        let mut store = GameStore::in_memory();
        store.update(|state| {
            state.meta.game_id = "g-1".to_string();
            state.currency.mana = 42.0;
        });
        store.save().unwrap();
        assert!(store.get().meta.last_save_time > 0);
        assert_eq!(store.get().meta.last_save_tick, 0);

        store.update(|state| state.currency.mana = 0.0);
        assert!(store.load(&content).unwrap());
        assert_eq!(store.get().currency.mana, 42.0);
        assert_eq!(store.get().meta.game_id, "g-1");
    }
}
