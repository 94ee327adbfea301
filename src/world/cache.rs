//! Derived world data rebuilt lazily after claim changes.

use super::interconnect::Interconnectedness;
use super::types::Position;
use std::collections::HashSet;

/// A value computed from other state, dropped when that state changes and
/// rebuilt on the next read.
#[derive(Debug, Clone)]
pub struct DerivedCache<T> {
    value: Option<T>,
}

impl<T> Default for DerivedCache<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> DerivedCache<T> {
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.value.is_none()
    }

    pub fn get_or_build(&mut self, build: impl FnOnce() -> T) -> &T {
        self.value.get_or_insert_with(build)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorldCaches {
    pub revealed: DerivedCache<HashSet<Position>>,
    pub interconnect: DerivedCache<Interconnectedness>,
}

impl WorldCaches {
    pub fn invalidate(&mut self) {
        self.revealed.invalidate();
        self.interconnect.invalidate();
    }
}

/// Caches are derived, so they never make two worlds differ.
impl PartialEq for WorldCaches {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
