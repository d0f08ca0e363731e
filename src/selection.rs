//! Compare-set selection.
//!
//! A [`Selection`] holds at most two property ids in the order they were
//! picked. Picking a third evicts the oldest pick, so the set always keeps the
//! two most recent clicks.

use crate::error::SelectionError;
use crate::models::PropertyId;
use std::collections::VecDeque;
use tracing::debug;

/// Ordered queue with a fixed capacity; pushing onto a full queue drops the
/// front (oldest) element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictingQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: PartialEq> EvictingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "EvictingQueue capacity must be non-zero");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning whatever had to be evicted to make room
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Remove the first element equal to `item`, keeping the order of the rest
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|x| x == item) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// What a toggle did to the compare set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Added, and the oldest pick was dropped to make room
    Replaced { evicted: PropertyId },
}

/// How many listings can be compared side by side
pub const COMPARE_CAPACITY: usize = 2;

/// The current compare set, 0 to 2 distinct ids in selection order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    picks: EvictingQueue<PropertyId>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            picks: EvictingQueue::new(COMPARE_CAPACITY),
        }
    }

    pub fn toggle(&mut self, id: PropertyId) -> Toggle {
        let outcome = if self.picks.remove(&id) {
            Toggle::Removed
        } else {
            match self.picks.push(id) {
                Some(evicted) => Toggle::Replaced { evicted },
                None => Toggle::Added,
            }
        };
        debug!(id, ?outcome, selected = self.picks.len(), "compare selection toggled");
        outcome
    }

    /// Selected ids, oldest first
    pub fn compare_set(&self) -> Vec<PropertyId> {
        self.picks.iter().copied().collect()
    }

    pub fn is_selected(&self, id: PropertyId) -> bool {
        self.picks.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Whether a comparison can be opened right now
    pub fn is_ready(&self) -> bool {
        self.picks.is_full()
    }

    /// The selected pair in selection order
    pub fn request_compare(&self) -> Result<(PropertyId, PropertyId), SelectionError> {
        let mut ids = self.picks.iter().copied();
        match (ids.next(), ids.next()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(SelectionError::InsufficientSelection {
                selected: self.picks.len(),
            }),
        }
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }
}
