//! # LFU with average-frequency aging
//!
//! Plain LFU has two long-horizon failure modes: frequency counters only
//! ever grow, and an entry that was hot last hour can squat above fresher
//! entries indefinitely. This variant tracks the sum of all resident
//! frequencies and, whenever the average frequency crosses a configured
//! ceiling, runs an aging pass that lowers every entry's frequency by half
//! the ceiling (at least 1), flooring frequencies at 1. Entries no longer
//! accessed lose rank with each pass and eventually fall into the minimum
//! bucket, where they are evicted.
//!
//! Aging is deliberately approximate: the pass is O(n) over resident
//! entries and rebalances relative rank rather than preserving exact
//! ratios.
//!
//! Unlike [`LfuCore`](crate::policy::lfu::LfuCore), overwriting an existing
//! key counts as an access here: the write path routes through the same
//! bump-and-reorder step as a lookup.

#[cfg(feature = "concurrency")]
use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::frequency_buckets::FrequencyBuckets;
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::CoreCache;

/// Default average-frequency ceiling; high enough that aging never triggers
/// unless explicitly configured.
pub const DEFAULT_MAX_AVG_FREQ: u64 = 1_000_000;

/// Single-threaded LFU core with average-frequency aging.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lfu_avg::LfuAvgCore;
/// use cachemgr::traits::CoreCache;
///
/// let mut cache = LfuAvgCore::with_max_avg_freq(3, 4);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.insert(3, "c");
///
/// // Hammer one key until the average frequency crosses 4; the aging pass
/// // then pulls every counter down by 2 (floored at 1).
/// for _ in 0..12 {
///     cache.get(&1);
/// }
/// assert_eq!(cache.frequency(&1), Some(11));
/// assert_eq!(cache.frequency(&2), Some(1));
/// ```
#[derive(Debug)]
pub struct LfuAvgCore<K, V> {
    order: FrequencyBuckets<K>,
    values: FxHashMap<K, V>,
    capacity: usize,
    max_avg_freq: u64,
    total_freq: u64,
}

impl<K, V> LfuAvgCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with the default (effectively disabled) aging ceiling.
    pub fn new(capacity: usize) -> Self {
        Self::with_max_avg_freq(capacity, DEFAULT_MAX_AVG_FREQ)
    }

    /// Creates a cache that ages all entries whenever the average resident
    /// frequency exceeds `max_avg_freq`.
    pub fn with_max_avg_freq(capacity: usize, max_avg_freq: u64) -> Self {
        LfuAvgCore {
            order: FrequencyBuckets::new(),
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            max_avg_freq,
            total_freq: 0,
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

    /// Returns the configured aging ceiling.
    pub fn max_avg_freq(&self) -> u64 {
        self.max_avg_freq
    }

    /// Returns the current sum of all resident frequencies.
    pub fn total_freq(&self) -> u64 {
        self.total_freq
    }

    /// Clears all entries and resets the frequency accounting.
    pub fn purge(&mut self) {
        self.order.clear();
        self.values.clear();
        self.total_freq = 0;
    }

    // One frequency point was just added somewhere; re-check the average and
    // age everything if it crossed the ceiling.
    fn note_frequency_added(&mut self) {
        self.total_freq += 1;
        let len = self.values.len() as u64;
        if len == 0 {
            return;
        }
        if self.total_freq / len > self.max_avg_freq {
            // Half the ceiling, but never zero: an aging pass must always
            // make progress or the overshoot recurs on every access.
            let decrement = (self.max_avg_freq / 2).max(1);
            self.total_freq = self.order.age(decrement);
        }
    }

    fn evict_one(&mut self) {
        if let Some((key, freq)) = self.order.pop_min() {
            self.values.remove(&key);
            self.total_freq = self.total_freq.saturating_sub(freq);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.order.len(), self.values.len());
        assert!(self.values.len() <= self.capacity);
        self.order.debug_validate_invariants();
        let actual_total: u64 = self
            .values
            .keys()
            .map(|key| self.order.frequency(key).expect("value without order entry"))
            .sum();
        assert_eq!(self.total_freq, actual_total);
        if !self.values.is_empty() {
            assert!(self.total_freq / self.values.len() as u64 <= self.max_avg_freq + 1);
        }
    }
}

impl<K, V> CoreCache<K, V> for LfuAvgCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts a key-value pair.
    ///
    /// Overwriting an existing key replaces the value *and* bumps its
    /// frequency — the write path counts as an access in this policy. A new
    /// key is admitted at frequency 1, evicting the oldest entry of the
    /// lowest-frequency bucket if the cache is full.
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(existing) = self.values.get_mut(&key) {
            let previous = std::mem::replace(existing, value);
            self.order.touch(&key);
            self.note_frequency_added();
            return Some(previous);
        }

        if self.values.len() >= self.capacity {
            self.evict_one();
        }

        self.order.insert(key.clone());
        self.values.insert(key, value);
        self.note_frequency_added();
        None
    }

    /// Looks up a key, bumping its frequency on a hit and possibly
    /// triggering an aging pass.
    fn get(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.order.touch(key);
        self.note_frequency_added();
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

impl<K, V> Default for LfuAvgCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with capacity 16 and the default aging ceiling.
    fn default() -> Self {
        Self::new(16)
    }
}

/// Thread-safe LFU-with-aging cache; one exclusive lock per instance.
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentLfuAvgCache<K, V> {
    inner: Arc<Mutex<LfuAvgCore<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLfuAvgCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a thread-safe cache with the default aging ceiling.
    pub fn new(capacity: usize) -> Self {
        Self::with_max_avg_freq(capacity, DEFAULT_MAX_AVG_FREQ)
    }

    /// Creates a thread-safe cache with an explicit aging ceiling.
    pub fn with_max_avg_freq(capacity: usize, max_avg_freq: u64) -> Self {
        ConcurrentLfuAvgCache {
            inner: Arc::new(Mutex::new(LfuAvgCore::with_max_avg_freq(
                capacity,
                max_avg_freq,
            ))),
        }
    }

    /// Inserts a key-value pair; see [`LfuAvgCore::insert`].
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Looks up a key, returning a clone of the value.
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

    /// Clears all entries and resets the frequency accounting.
    pub fn purge(&self) {
        self.inner.lock().purge();
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLfuAvgCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLfuAvgCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .field("max_avg_freq", &cache.max_avg_freq())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLfuAvgCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lfu_avg_behaves_like_lfu_below_ceiling() {
        let mut cache = LfuAvgCore::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.get(&1);

        cache.insert(3, "c");
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_avg_overwrite_bumps_frequency() {
        let mut cache = LfuAvgCore::new(2);
        cache.insert(1, "a");
        assert_eq!(cache.frequency(&1), Some(1));
        assert_eq!(cache.insert(1, "a2"), Some("a"));
        assert_eq!(cache.frequency(&1), Some(2));
        assert_eq!(cache.total_freq(), 2);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_avg_aging_pass_lowers_all_frequencies() {
        let mut cache = LfuAvgCore::with_max_avg_freq(3, 4);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");

        // total = 3; each get of key 1 adds one. The average first exceeds 4
        // at total 15, i.e. on the 12th get, when key 1 has reached 13.
        for _ in 0..11 {
            cache.get(&1);
        }
        assert_eq!(cache.frequency(&1), Some(12));
        assert_eq!(cache.total_freq(), 14);

        cache.get(&1);
        // Aged by max_avg / 2 = 2, floored at 1.
        assert_eq!(cache.frequency(&1), Some(11));
        assert_eq!(cache.frequency(&2), Some(1));
        assert_eq!(cache.frequency(&3), Some(1));
        assert_eq!(cache.min_freq(), Some(1));
        assert_eq!(cache.total_freq(), 13);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_avg_aged_hotspot_eventually_evicted() {
        let mut cache = LfuAvgCore::with_max_avg_freq(2, 2);
        cache.insert(1, "old_hot");
        for _ in 0..6 {
            cache.get(&1);
        }
        cache.insert(2, "fresh");

        // Keep hitting the fresh key; aging passes grind the idle hotspot
        // down until it becomes the eviction candidate.
        for _ in 0..12 {
            cache.get(&2);
        }
        assert_eq!(cache.min_freq(), Some(cache.frequency(&1).unwrap()));
        cache.insert(3, "newer");
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_avg_eviction_subtracts_frequency() {
        let mut cache = LfuAvgCore::new(2);
        cache.insert(1, "a");
        cache.get(&1);
        cache.insert(2, "b");
        assert_eq!(cache.total_freq(), 3);

        cache.insert(3, "c");
        // Key 2 (freq 1) evicted; its point leaves the total, key 3 adds one.
        assert!(!cache.contains(&2));
        assert_eq!(cache.total_freq(), 3);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_avg_zero_capacity_is_inert() {
        let mut cache = LfuAvgCore::new(0);
        assert_eq!(cache.insert(1, "a"), None);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
        assert_eq!(cache.total_freq(), 0);
    }

    #[test]
    fn lfu_avg_purge_resets_accounting() {
        let mut cache = LfuAvgCore::new(4);
        cache.insert(1, "a");
        cache.get(&1);
        cache.purge();
        assert!(cache.is_empty());
        assert_eq!(cache.total_freq(), 0);
        assert_eq!(cache.min_freq(), None);
        cache.debug_validate_invariants();
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn concurrent_lfu_avg_basic_ops() {
        let cache = ConcurrentLfuAvgCache::with_max_avg_freq(4, 100);
        cache.insert(1, 5u64);
        assert_eq!(cache.get(&1), Some(5));
        assert_eq!(cache.get_or_default(&2), 0);
        assert_eq!(cache.frequency(&1), Some(2));
        cache.purge();
        assert!(cache.is_empty());
    }
}
