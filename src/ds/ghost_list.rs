//! Bounded key-only list for ghost entries.
//!
//! Adaptive policies (ARC-style) remember the keys of recently evicted
//! entries without keeping their values. A hit on a ghost key is the signal
//! that the evicting side of the cache was under-provisioned.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────┐   ┌────────────────────────────────┐
//!   │  index: FxHashMap<K, SlotId> │   │  list: IntrusiveList<K>        │
//!   │                              │   │                                │
//!   │   "a" ─► id_0                │   │  front ─► [a] ◄─► [b] ◄─► [c]  │
//!   │   "b" ─► id_1                │   │          oldest         newest │
//!   │   "c" ─► id_2                │   │                                │
//!   └──────────────────────────────┘   └────────────────────────────────┘
//! ```
//!
//! Keys are recorded at the newest end; when the list is full the oldest key
//! is dropped, so eviction order is FIFO by insertion. Re-recording a key
//! that is already tracked re-enqueues it at the newest position.
//!
//! ## Operations
//!
//! | Operation      | Description                              | Complexity |
//! |----------------|------------------------------------------|------------|
//! | `record`       | Track key, dropping the oldest if full   | O(1) avg   |
//! | `remove`       | Untrack key (the ghost-hit path)         | O(1) avg   |
//! | `contains`     | Check whether a key is tracked           | O(1) avg   |
//! | `set_capacity` | Resize, trimming oldest keys on shrink   | O(delta)   |
//!
//! A zero-capacity ghost list ignores all records.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;

/// Bounded FIFO of evicted keys with O(1) membership checks.
///
/// # Example
///
/// ```
/// use cachemgr::ds::GhostList;
///
/// let mut ghost = GhostList::new(2);
/// ghost.record("a");
/// ghost.record("b");
///
/// // At capacity: recording a third key drops the oldest.
/// ghost.record("c");
/// assert!(!ghost.contains(&"a"));
/// assert!(ghost.contains(&"b"));
/// assert!(ghost.contains(&"c"));
///
/// // Ghost hit: the key is consumed.
/// assert!(ghost.remove(&"b"));
/// assert!(!ghost.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct GhostList<K> {
    list: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list tracking at most `capacity` keys.
    ///
    /// A capacity of 0 creates a list that ignores all records.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is tracked. This is the ghost-hit check.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` at the newest position, dropping the oldest tracked key
    /// if the list is full. Re-recording an existing key re-enqueues it.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_back(id);
            return;
        }

        if self.list.len() >= self.capacity {
            if let Some(old_key) = self.list.pop_front() {
                self.index.remove(&old_key);
            }
        }

        let id = self.list.push_back(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key` from the list; returns `true` if it was tracked.
    ///
    /// Called after a ghost hit so the same eviction is not counted twice.
    pub fn remove(&mut self, key: &K) -> bool {
        let id = match self.index.remove(key) {
            Some(id) => id,
            None => return false,
        };
        self.list.remove(id);
        true
    }

    /// Changes the capacity, dropping oldest keys if the new capacity is
    /// smaller than the current length.
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.list.len() > capacity {
            if let Some(old_key) = self.list.pop_front() {
                self.index.remove(&old_key);
            }
        }
        self.capacity = capacity;
    }

    /// Clears all tracked keys.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for &id in self.index.values() {
            assert!(self.list.contains(id));
        }
        self.list.debug_validate_invariants();
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the tracked keys in oldest-to-newest order.
    pub fn debug_snapshot_keys(&self) -> Vec<K> {
        self.list.iter().cloned().collect()
    }
}
