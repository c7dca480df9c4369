//! # Least Frequently Used (LFU) cache
//!
//! Evicts the entry with the lowest access frequency; among entries tied at
//! the lowest frequency, the one admitted earliest goes first.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │                         LfuCore<K, V>                          │
//!   │                                                                │
//!   │   ┌──────────────────────────────┐  ┌────────────────────────┐ │
//!   │   │ order: FrequencyBuckets<K>   │  │ values: FxHashMap<K,V> │ │
//!   │   │                              │  │                        │ │
//!   │   │  freq 1: [d]        ◄─ min   │  │  a ─► "..."            │ │
//!   │   │  freq 3: [b, c]              │  │  b ─► "..."            │ │
//!   │   │  freq 8: [a]                 │  │  c ─► "..."            │ │
//!   │   │          oldest → newest     │  │  d ─► "..."            │ │
//!   │   └──────────────────────────────┘  └────────────────────────┘ │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `get` detaches the entry from its bucket, bumps its frequency by one
//! and appends it to the next bucket; `min_freq` is maintained incrementally
//! through the bucket chain. An `insert` that overwrites an existing key
//! updates the value only — writes record state, not popularity.
//!
//! ## LFU vs LRU
//!
//! ```text
//!   Pattern: A,B,A,C,A,D,A,E (A is hot), capacity 3
//!
//!   LRU keeps whatever was touched last and eventually drops A.
//!   LFU keeps A pinned at its high frequency and churns the cold tail.
//! ```
//!
//! The flip side is stale hotspots: an entry that was hot once can squat at
//! a high frequency long after it stopped being accessed. See
//! [`lfu_avg`](crate::policy::lfu_avg) for the aging variant that addresses
//! this.

#[cfg(feature = "concurrency")]
use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::frequency_buckets::FrequencyBuckets;
#[cfg(feature = "metrics")]
use crate::metrics::{MetricsSnapshot, PolicyMetrics};
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::CoreCache;

/// Single-threaded LFU cache core with O(1) bucketed eviction.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lfu::LfuCore;
/// use cachemgr::traits::CoreCache;
///
/// let mut cache = LfuCore::new(2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.get(&1);
///
/// // Key 2 has the lowest frequency and is evicted.
/// cache.insert(3, "c");
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
#[derive(Debug)]
pub struct LfuCore<K, V> {
    order: FrequencyBuckets<K>,
    values: FxHashMap<K, V>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: PolicyMetrics,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        LfuCore {
            order: FrequencyBuckets::new(),
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: PolicyMetrics::default(),
        }
    }

    /// Returns the access frequency of a resident key.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.order.frequency(key)
    }

    /// Returns the lowest frequency currently present, if any.
    pub fn min_freq(&self) -> Option<u64> {
        self.order.min_freq()
    }

    /// Returns the eviction candidate without removing it.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let (key, _) = self.order.peek_min()?;
        let value = self.values.get(key)?;
        Some((key, value))
    }

    /// Removes and returns the least frequently used entry.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let (key, _) = self.order.pop_min()?;
        let value = self.values.remove(&key)?;
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction();
        Some((key, value))
    }

    /// Removes a key, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.order.remove(key)?;
        self.values.remove(key)
    }

    /// Clears all entries and resets frequency bookkeeping.
    pub fn purge(&mut self) {
        self.order.clear();
        self.values.clear();
    }

    #[cfg(feature = "metrics")]
    /// Returns a snapshot of the operation counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.order.len(), self.values.len());
        assert!(self.values.len() <= self.capacity);
        self.order.debug_validate_invariants();
        for key in self.values.keys() {
            assert!(self.order.contains(key));
        }
    }
}

impl<K, V> CoreCache<K, V> for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts a key-value pair.
    ///
    /// Overwriting an existing key replaces the value without bumping its
    /// frequency. A new key is admitted at frequency 1, evicting the oldest
    /// entry of the lowest-frequency bucket if the cache is full.
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(existing) = self.values.get_mut(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_update();
            return Some(std::mem::replace(existing, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert();

        if self.values.len() >= self.capacity {
            self.pop_lfu();
        }

        self.order.insert(key.clone());
        self.values.insert(key, value);
        None
    }

    /// Looks up a key, bumping its frequency on a hit.
    fn get(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_miss();
            return None;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_hit();
        self.order.touch(key);
        self.values.get(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.purge();
    }
}

impl<K, V> Default for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache with a default capacity of 16.
    fn default() -> Self {
        Self::new(16)
    }
}

/// Thread-safe LFU cache; one exclusive lock per instance.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lfu::ConcurrentLfuCache;
///
/// let cache = ConcurrentLfuCache::new(64);
/// cache.insert("page", vec![1u8, 2, 3]);
/// assert_eq!(cache.get(&"page"), Some(vec![1, 2, 3]));
/// ```
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentLfuCache<K, V> {
    inner: Arc<Mutex<LfuCore<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a thread-safe LFU cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        ConcurrentLfuCache {
            inner: Arc::new(Mutex::new(LfuCore::new(capacity))),
        }
    }

    /// Inserts a key-value pair; see [`LfuCore::insert`].
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Looks up a key, bumping its frequency, and returns a clone of the
    /// value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Single-value lookup returning `V::default()` on a miss.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Returns the frequency of a resident key.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
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

    /// Clears all entries and resets frequency bookkeeping.
    pub fn purge(&self) {
        self.inner.lock().purge();
    }

    #[cfg(feature = "metrics")]
    /// Returns a snapshot of the operation counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLfuCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lfu_insert_get_roundtrip() {
        let mut cache = LfuCore::new(4);
        assert_eq!(cache.insert(1, "a"), None);
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.frequency(&1), Some(2));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_evicts_lowest_frequency_oldest_first() {
        let mut cache = LfuCore::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.get(&1);
        cache.get(&2);
        cache.get(&1);

        // Frequencies: 1 -> 3, 2 -> 2; key 2 sits in the min bucket.
        cache.insert(3, "c");
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(&"c"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_tie_break_is_admission_order() {
        let mut cache = LfuCore::new(3);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");

        // All at frequency 1; the earliest admitted goes first.
        assert_eq!(cache.pop_lfu(), Some((1, "a")));
        assert_eq!(cache.pop_lfu(), Some((2, "b")));
        assert_eq!(cache.pop_lfu(), Some((3, "c")));
        assert_eq!(cache.pop_lfu(), None);
    }

    #[test]
    fn lfu_overwrite_does_not_bump_frequency() {
        let mut cache = LfuCore::new(2);
        cache.insert(1, "a");
        assert_eq!(cache.insert(1, "a2"), Some("a"));
        assert_eq!(cache.frequency(&1), Some(1));
        assert_eq!(cache.get(&1), Some(&"a2"));
        assert_eq!(cache.frequency(&1), Some(2));
    }

    #[test]
    fn lfu_new_entry_resets_min_freq() {
        let mut cache = LfuCore::new(3);
        cache.insert(1, "a");
        cache.get(&1);
        cache.get(&1);
        assert_eq!(cache.min_freq(), Some(3));

        cache.insert(2, "b");
        assert_eq!(cache.min_freq(), Some(1));
        assert_eq!(cache.peek_lfu(), Some((&2, &"b")));
    }

    #[test]
    fn lfu_zero_capacity_is_inert() {
        let mut cache = LfuCore::new(0);
        assert_eq!(cache.insert(1, "a"), None);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn lfu_remove_and_purge() {
        let mut cache = LfuCore::new(3);
        cache.insert(1, "a");
        cache.insert(2, "b");
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);

        cache.purge();
        assert!(cache.is_empty());
        assert_eq!(cache.min_freq(), None);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_get_twice_keeps_membership() {
        let mut cache = LfuCore::new(2);
        cache.insert(1, "a");
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.len(), 1);
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn concurrent_lfu_basic_ops() {
        let cache = ConcurrentLfuCache::new(2);
        cache.insert(1, "a".to_string());
        cache.insert(2, "b".to_string());
        cache.get(&1);

        cache.insert(3, "c".to_string());
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some("a".to_string()));
        cache.purge();
        assert!(cache.is_empty());
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn lfu_metrics_counts_evictions() {
        let mut cache = LfuCore::new(1);
        cache.insert(1, "a");
        cache.insert(2, "b");

        let snapshot = cache.metrics_snapshot();
        assert_eq!(snapshot.inserts, 2);
        assert_eq!(snapshot.evictions, 1);
    }
}
