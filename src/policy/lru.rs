//! # Least Recently Used (LRU) cache
//!
//! Bounded map with recency ordering: every access moves the entry to the
//! most-recent end of an intrusive list, and eviction removes the entry at
//! the least-recent end.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │                        LruCore<K, V>                            │
//!   │                                                                 │
//!   │   ┌───────────────────────────┐                                 │
//!   │   │ index: FxHashMap<K, SlotId>                                 │
//!   │   │                           │                                 │
//!   │   │   page_1 ─► id_0          │                                 │
//!   │   │   page_2 ─► id_1          │                                 │
//!   │   │   page_3 ─► id_2          │                                 │
//!   │   └─────────────┬─────────────┘                                 │
//!   │                 ▼                                               │
//!   │   ┌─────────────────────────────────────────────────────────┐   │
//!   │   │ list: IntrusiveList<Entry { key, value, hits }>         │   │
//!   │   │                                                         │   │
//!   │   │  front ──► [id_0] ◄──► [id_1] ◄──► [id_2] ◄── back      │   │
//!   │   │            least                   most                 │   │
//!   │   │            recent                  recent               │   │
//!   │   └─────────────────────────────────────────────────────────┘   │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation flow
//!
//! ```text
//!   insert(D) with capacity 3 full:
//!     before:  front ─► [A] ◄─► [B] ◄─► [C] ◄─ back
//!     1. pop front [A] (least recent)
//!     2. push [D] at back
//!     after:   front ─► [B] ◄─► [C] ◄─► [D] ◄─ back
//!
//!   get(B):
//!     move [B] to back; order becomes [C] ◄─► [D] ◄─► [B]
//!
//!   peek(C):
//!     index lookup only, order unchanged
//! ```
//!
//! ## Methods
//!
//! | Method           | Complexity | Description                             |
//! |------------------|------------|-----------------------------------------|
//! | `insert(k, v)`   | O(1) avg   | Insert or update, may evict the LRU     |
//! | `get(&k)`        | O(1) avg   | Lookup, moves entry to most recent      |
//! | `peek(&k)`       | O(1) avg   | Lookup without touching recency order   |
//! | `remove(&k)`     | O(1) avg   | Remove entry by key                     |
//! | `pop_lru()`      | O(1)       | Remove and return the least recent      |
//! | `peek_lru()`     | O(1)       | Inspect the least recent entry          |
//! | `touch(&k)`      | O(1) avg   | Refresh recency without reading         |
//!
//! ## Thread safety
//!
//! - [`LruCore`]: single-threaded (`&mut self`).
//! - [`ConcurrentLruCache`]: wraps the core in one `parking_lot::Mutex`; every
//!   public operation holds the lock for its full duration, so operations on
//!   one instance are totally ordered.

#[cfg(feature = "concurrency")]
use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
#[cfg(feature = "metrics")]
use crate::metrics::{MetricsSnapshot, PolicyMetrics};
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, MutableCache};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hits: u64,
}

/// Single-threaded LRU cache core.
///
/// Entries live in an arena-backed intrusive list indexed by an `FxHashMap`,
/// so access, update and eviction are all O(1) without raw pointers.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lru::LruCore;
/// use cachemgr::traits::CoreCache;
///
/// let mut cache = LruCore::new(2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
///
/// // Touch key 1, making key 2 the eviction candidate.
/// assert_eq!(cache.get(&1), Some(&"a"));
///
/// cache.insert(3, "c");
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// assert!(cache.contains(&3));
/// ```
#[derive(Debug)]
pub struct LruCore<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: PolicyMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 creates an inert cache: inserts are no-ops and every
    /// lookup misses.
    pub fn new(capacity: usize) -> Self {
        LruCore {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: IntrusiveList::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: PolicyMetrics::default(),
        }
    }

    /// Looks up a value without updating recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.front().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_front()?;
        self.index.remove(&entry.key);
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction();
        Some((entry.key, entry.value))
    }

    /// Marks a key as most recently used without reading its value.
    ///
    /// Returns `true` if the key was resident.
    pub fn touch(&mut self, key: &K) -> bool {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => return false,
        };
        self.list.move_to_back(id);
        if let Some(entry) = self.list.get_mut(id) {
            entry.hits += 1;
        }
        true
    }

    /// Returns how many times a resident key has been accessed.
    ///
    /// The count starts at 1 on admission and grows on every `get`/`touch`.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| entry.hits)
    }

    #[cfg(feature = "metrics")]
    /// Returns a snapshot of the operation counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.list.len());
        assert!(self.list.len() <= self.capacity);
        self.list.debug_validate_invariants();
        for (key, &id) in &self.index {
            let entry = self.list.get(id).expect("indexed entry missing from list");
            assert!(&entry.key == key);
            assert!(entry.hits >= 1);
        }
    }
}

impl<K, V> CoreCache<K, V> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_update();
            let previous = self
                .list
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
            self.list.move_to_back(id);
            return previous;
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert();

        if self.index.len() >= self.capacity {
            self.pop_lru();
        }

        let id = self.list.push_back(Entry {
            key: key.clone(),
            value,
            hits: 1,
        });
        self.index.insert(key, id);
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_miss();
                return None;
            }
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_hit();

        self.list.move_to_back(id);
        if let Some(entry) = self.list.get_mut(id) {
            entry.hits += 1;
        }
        self.list.get(id).map(|entry| &entry.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }
}

impl<K, V> MutableCache<K, V> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }
}

impl<K, V> Default for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache with a default capacity of 16.
    fn default() -> Self {
        Self::new(16)
    }
}

impl<K, V> Extend<(K, V)> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LRU cache.
///
/// Wraps [`LruCore`] behind a single `parking_lot::Mutex`; each public
/// operation acquires the lock for its whole duration and lookups return
/// clones of the stored value.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lru::ConcurrentLruCache;
///
/// let cache = ConcurrentLruCache::new(100);
/// cache.insert(1, "value".to_string());
///
/// assert_eq!(cache.get(&1), Some("value".to_string()));
/// assert_eq!(cache.get(&999), None);
/// ```
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentLruCache<K, V> {
    inner: Arc<Mutex<LruCore<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a thread-safe LRU cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        ConcurrentLruCache {
            inner: Arc::new(Mutex::new(LruCore::new(capacity))),
        }
    }

    /// Inserts a key-value pair, returning the previous value if present.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Looks up a key, marks it most recently used and returns a clone of
    /// its value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Single-value lookup: returns the stored value on a hit, or
    /// `V::default()` on a miss.
    ///
    /// # Example
    ///
    /// ```
    /// use cachemgr::policy::lru::ConcurrentLruCache;
    ///
    /// let cache: ConcurrentLruCache<u32, u64> = ConcurrentLruCache::new(4);
    /// cache.insert(1, 10);
    ///
    /// assert_eq!(cache.get_or_default(&1), 10);
    /// assert_eq!(cache.get_or_default(&2), 0);
    /// ```
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Looks up a key without updating recency order.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Removes a key, returning its value if it was resident.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    /// Returns `true` if the key is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[cfg(feature = "metrics")]
    /// Returns a snapshot of the operation counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// LruCore behaves like a VecDeque-based reference model.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..8,
            ops in prop::collection::vec((0u8..3, 0u32..12), 0..80)
        ) {
            let mut cache: LruCore<u32, u32> = LruCore::new(capacity);
            // Model: front = least recent.
            let mut model: std::collections::VecDeque<(u32, u32)> = std::collections::VecDeque::new();

            for (op, key) in ops {
                match op {
                    0 => {
                        cache.insert(key, key * 10);
                        if let Some(pos) = model.iter().position(|&(k, _)| k == key) {
                            model.remove(pos);
                        } else if model.len() >= capacity {
                            model.pop_front();
                        }
                        model.push_back((key, key * 10));
                    }
                    1 => {
                        let expected = model.iter().position(|&(k, _)| k == key);
                        let got = cache.get(&key).copied();
                        match expected {
                            Some(pos) => {
                                let entry = model.remove(pos).expect("model entry");
                                model.push_back(entry);
                                prop_assert_eq!(got, Some(entry.1));
                            }
                            None => prop_assert_eq!(got, None),
                        }
                    }
                    _ => {
                        let expected = model.iter().position(|&(k, _)| k == key);
                        let got = cache.remove(&key);
                        match expected {
                            Some(pos) => {
                                let entry = model.remove(pos).expect("model entry");
                                prop_assert_eq!(got, Some(entry.1));
                            }
                            None => prop_assert_eq!(got, None),
                        }
                    }
                }

                cache.debug_validate_invariants();
                prop_assert_eq!(cache.len(), model.len());
                prop_assert_eq!(
                    cache.peek_lru().map(|(k, v)| (*k, *v)),
                    model.front().copied()
                );
            }
        }
    }
}
