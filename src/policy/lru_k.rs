//! # LRU-K admission-filtered cache
//!
//! Standard LRU admits a key on first contact, so a one-shot scan of cold
//! keys can flush the entire working set. LRU-K puts an admission filter in
//! front of the main LRU: a key must be observed `K` times before it may
//! occupy a main slot.
//!
//! ## Structure
//!
//! ```text
//!   ┌──────────────────────────────┐     count >= K      ┌────────────────┐
//!   │ history: LruCore<K, count>   │ ──────────────────► │ main: LruCore  │
//!   │ (capacity H, LRU-evicted)    │   admit with the    │ (capacity C)   │
//!   └──────────────────────────────┘   staged value      └────────────────┘
//!              ▲
//!              │ staged: FxHashMap<K, V>
//!              │ latest value observed for keys still in history
//! ```
//!
//! Every `insert` of a non-resident key and every `get` — hit or miss —
//! counts as one observation. Once a key's observation count reaches `K` it
//! is admitted to the main LRU carrying the most recently observed value,
//! and its history and staged entries are dropped. History entries
//! themselves are LRU-evicted when the history is full, and an evicted
//! history key loses its staged value with it.
//!
//! `K = 2` is the recommended setting: higher values resist scans better but
//! make the cache slow to adopt genuinely new hot keys.

#[cfg(feature = "concurrency")]
use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::policy::lru::LruCore;
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, MutableCache};

/// Default number of observations required before admission.
pub const DEFAULT_K: u64 = 2;

/// Single-threaded LRU-K cache core.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lru_k::LrukCore;
/// use cachemgr::traits::CoreCache;
///
/// let mut cache = LrukCore::new(2, 4);
///
/// // One observation is not enough for admission.
/// cache.insert(1, "a");
/// assert_eq!(cache.len(), 0);
///
/// // The second observation admits the key.
/// cache.insert(1, "a");
/// assert_eq!(cache.get(&1), Some(&"a"));
/// ```
#[derive(Debug)]
pub struct LrukCore<K, V> {
    main: LruCore<K, V>,
    history: LruCore<K, u64>,
    staged: FxHashMap<K, V>,
    k: u64,
}

impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU-K cache with main capacity `capacity`, history
    /// capacity `history_capacity` and the default `K` of 2.
    pub fn new(capacity: usize, history_capacity: usize) -> Self {
        Self::with_k(capacity, history_capacity, DEFAULT_K)
    }

    /// Creates an LRU-K cache requiring `k` observations before admission.
    ///
    /// `k` should be at least 1; with `k = 1` the filter admits on first
    /// contact and the cache degenerates to plain LRU.
    pub fn with_k(capacity: usize, history_capacity: usize, k: u64) -> Self {
        LrukCore {
            main: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            staged: FxHashMap::default(),
            k,
        }
    }

    /// Returns the number of observations required for admission.
    pub fn k_value(&self) -> u64 {
        self.k
    }

    /// Returns the number of keys currently tracked in the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // Records one observation of `key` and returns the updated count.
    //
    // The history is itself an LRU: admitting a new key to a full history
    // evicts the stalest tracked key, whose staged value goes with it.
    fn observe(&mut self, key: &K) -> u64 {
        let count = self.history.get(key).copied().unwrap_or(0) + 1;
        if count == 1
            && self.history.capacity() > 0
            && self.history.len() == self.history.capacity()
        {
            let evicted = self.history.peek_lru().map(|(k, _)| k.clone());
            if let Some(evicted) = evicted {
                self.staged.remove(&evicted);
            }
        }
        self.history.insert(key.clone(), count);
        count
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.main.debug_validate_invariants();
        self.history.debug_validate_invariants();
        for key in self.staged.keys() {
            assert!(self.history.contains(key), "staged value without history");
            assert!(!self.main.contains(key), "staged value for resident key");
        }
    }
}

impl<K, V> CoreCache<K, V> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts a key-value pair.
    ///
    /// A key already resident in main is updated in place. Otherwise the
    /// insert counts as one observation and the value is staged; the key is
    /// admitted once its count reaches `K`.
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.main.contains(&key) {
            return self.main.insert(key, value);
        }

        let count = self.observe(&key);
        if count >= self.k {
            self.history.remove(&key);
            self.staged.remove(&key);
            self.main.insert(key, value);
        } else {
            self.staged.insert(key, value);
        }
        None
    }

    /// Looks up a key.
    ///
    /// Every call counts as one observation, including lookups of keys that
    /// are already resident in main — preserving the admission histories of
    /// hot keys across their eviction and re-admission. A miss whose
    /// observation count reaches `K` admits the staged value and returns it
    /// as a hit.
    fn get(&mut self, key: &K) -> Option<&V> {
        let in_main = self.main.touch(key);
        let count = self.observe(key);

        if in_main {
            return self.main.peek(key);
        }

        if count >= self.k {
            if let Some(value) = self.staged.remove(key) {
                self.history.remove(key);
                self.main.insert(key.clone(), value);
                return self.main.peek(key);
            }
        }
        None
    }

    fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    fn len(&self) -> usize {
        self.main.len()
    }

    fn capacity(&self) -> usize {
        self.main.capacity()
    }

    fn clear(&mut self) {
        self.main.clear();
        self.history.clear();
        self.staged.clear();
    }
}

impl<K, V> MutableCache<K, V> for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Removes a key from the main cache. Its observation history, if any,
    /// is left intact.
    fn remove(&mut self, key: &K) -> Option<V> {
        self.main.remove(key)
    }
}

/// Thread-safe LRU-K cache; one exclusive lock per instance.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lru_k::ConcurrentLrukCache;
///
/// let cache = ConcurrentLrukCache::new(16, 32);
/// cache.insert(7, "cold");
/// assert!(!cache.contains(&7)); // staged, one observation so far
/// assert_eq!(cache.get(&7), Some("cold")); // second observation admits
/// ```
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentLrukCache<K, V> {
    inner: Arc<Mutex<LrukCore<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a thread-safe LRU-K cache with the default `K` of 2.
    pub fn new(capacity: usize, history_capacity: usize) -> Self {
        Self::with_k(capacity, history_capacity, DEFAULT_K)
    }

    /// Creates a thread-safe LRU-K cache with an explicit `k`.
    pub fn with_k(capacity: usize, history_capacity: usize, k: u64) -> Self {
        ConcurrentLrukCache {
            inner: Arc::new(Mutex::new(LrukCore::with_k(capacity, history_capacity, k))),
        }
    }

    /// Inserts a key-value pair; see [`LrukCore::insert`].
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Looks up a key, returning a clone of the value; see [`LrukCore::get`].
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

    /// Removes a key from the main cache.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Returns `true` if the key is resident in the main cache.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the main cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the main cache capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Returns the configured `K`.
    pub fn k_value(&self) -> u64 {
        self.inner.lock().k_value()
    }

    /// Clears the main cache, the history and all staged values.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLrukCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .field("k", &cache.k_value())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lruk_requires_k_observations_via_put() {
        let mut cache = LrukCore::new(2, 4);

        cache.insert(1, "a");
        assert!(!cache.contains(&1));
        assert_eq!(cache.history_len(), 1);

        cache.insert(1, "a");
        assert!(cache.contains(&1));
        assert_eq!(cache.get(&1), Some(&"a"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lruk_get_counts_as_observation_and_admits() {
        let mut cache = LrukCore::new(2, 4);

        cache.insert(2, "b");
        // put was observation one; this get is observation two, which crosses
        // K and admits the staged value.
        assert_eq!(cache.get(&2), Some(&"b"));
        assert!(cache.contains(&2));
        assert_eq!(cache.get(&2), Some(&"b"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lruk_admitted_entry_carries_latest_value() {
        let mut cache = LrukCore::with_k(2, 4, 3);

        cache.insert(1, "stale");
        cache.insert(1, "fresh");
        assert!(!cache.contains(&1));
        // Third observation admits with the latest staged value.
        cache.insert(1, "freshest");
        assert_eq!(cache.get(&1), Some(&"freshest"));
    }

    #[test]
    fn lruk_get_bumps_history_even_on_main_hits() {
        let mut cache = LrukCore::new(2, 4);
        cache.insert(1, "a");
        cache.insert(1, "a");
        assert!(cache.contains(&1));
        assert_eq!(cache.history_len(), 0);

        // A main hit re-creates the history entry.
        cache.get(&1);
        assert_eq!(cache.history_len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lruk_history_eviction_drops_staged_value() {
        let mut cache = LrukCore::new(4, 2);

        cache.insert(1, "a");
        cache.insert(2, "b");
        // History is full; observing key 3 evicts key 1's history and stage.
        cache.insert(3, "c");
        cache.debug_validate_invariants();

        // Key 1 starts over: this get is observation one again, not two.
        assert_eq!(cache.get(&1), None);
        assert!(!cache.contains(&1));
    }

    #[test]
    fn lruk_k1_degenerates_to_lru() {
        let mut cache = LrukCore::with_k(2, 4, 1);
        cache.insert(1, "a");
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn lruk_remove_leaves_history() {
        let mut cache = LrukCore::new(2, 4);
        cache.insert(1, "a");
        cache.insert(1, "a");
        assert_eq!(cache.remove(&1), Some("a"));
        assert!(!cache.contains(&1));
        assert_eq!(cache.remove(&1), None);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lruk_zero_capacity_main_is_inert() {
        let mut cache = LrukCore::new(0, 4);
        cache.insert(1, "a");
        cache.insert(1, "a");
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn lruk_clear_resets_everything() {
        let mut cache = LrukCore::new(2, 4);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(2, "b");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.history_len(), 0);
        cache.debug_validate_invariants();
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn concurrent_lruk_admission_flow() {
        let cache = ConcurrentLrukCache::new(2, 4);
        cache.insert(1, 100u64);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&1), Some(100));
        assert_eq!(cache.get_or_default(&2), 0);
        assert_eq!(cache.k_value(), 2);
    }
}
