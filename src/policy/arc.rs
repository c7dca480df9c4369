//! # Adaptive Replacement Cache (ARC)
//!
//! ARC balances recency against frequency at runtime instead of fixing the
//! trade-off at construction. This implementation realizes it as two
//! self-contained halves coupled through ghost feedback:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                            ArcCore<K, V>                              │
//! │                                                                       │
//! │   ┌───────────────────────────┐      ┌───────────────────────────┐    │
//! │   │   ArcLruPart (recency)    │      │   ArcLfuPart (frequency)  │    │
//! │   │                           │      │                           │    │
//! │   │  main: recency list       │      │  main: freq buckets       │    │
//! │   │  front=LRU ... back=MRU   │      │  min-freq eviction        │    │
//! │   │                           │      │                           │    │
//! │   │  ghost: keys evicted      │      │  ghost: keys evicted      │    │
//! │   │  from this half (FIFO)    │      │  from this half (FIFO)    │    │
//! │   └─────────────┬─────────────┘      └─────────────┬─────────────┘    │
//! │                 │                                  │                  │
//! │                 └────────── ghost feedback ────────┘                  │
//! │                                                                       │
//! │   hit in LRU ghost  → shrink LFU half by one, grow LRU half by one    │
//! │   hit in LFU ghost  → shrink LRU half by one, grow LFU half by one    │
//! │   (the donor must be shrinkable; total capacity is conserved)         │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data flow
//!
//! ```text
//!   insert(k, v):
//!     1. ghost check in both halves (may transfer one unit of capacity)
//!     2. always write into the LRU half
//!     3. if k is resident in the LFU half, write there too
//!
//!   get(k):
//!     1. ghost check in both halves
//!     2. LRU half first; a hit bumps the entry's access count, and at
//!        transform_threshold the entry is copied into the LFU half
//!     3. otherwise the LFU half (a hit bumps its frequency)
//! ```
//!
//! A hit on a ghost key means "this half evicted something it should have
//! kept": the complementary half donates one unit of capacity so the
//! under-provisioned side can grow. New keys prove themselves on the
//! recency side; repeat visitors get promoted to the frequency side where
//! one-shot scans cannot displace them.
//!
//! A key can be resident in both halves at once: promotion copies rather
//! than moves, and an insert refreshes both copies. The halves are loosely
//! coupled caches, not a strict T1/T2 partition, and `len` counts dual
//! residents twice.
//!
//! ## Thread safety
//!
//! [`ArcCore`] is single-threaded; [`ConcurrentArcCache`] serializes every
//! operation behind one exclusive lock.

#[cfg(feature = "concurrency")]
use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::ds::ghost_list::GhostList;
use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::KeyNotFoundError;
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;

/// Default access count at which an LRU-half entry is promoted.
pub const DEFAULT_TRANSFORM_THRESHOLD: u64 = 2;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hits: u64,
}

// ---------------------------------------------------------------------------
// Recency half
// ---------------------------------------------------------------------------

/// Recency side of ARC: an LRU list whose evictions feed a FIFO ghost of the
/// same capacity.
#[derive(Debug)]
pub struct ArcLruPart<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    ghost: GhostList<K>,
    capacity: usize,
    transform_threshold: u64,
}

impl<K, V> ArcLruPart<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize, transform_threshold: u64) -> Self {
        ArcLruPart {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: IntrusiveList::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
            transform_threshold,
        }
    }

    /// Looks up a key; a hit refreshes recency and bumps the access count.
    ///
    /// The boolean is the promotion signal: `true` once the access count has
    /// reached the transform threshold.
    pub fn get(&mut self, key: &K) -> Option<(&V, bool)> {
        let id = *self.index.get(key)?;
        self.list.move_to_back(id);
        let threshold = self.transform_threshold;
        let entry = self.list.get_mut(id)?;
        entry.hits += 1;
        let promote = entry.hits >= threshold;
        Some((&entry.value, promote))
    }

    /// Inserts or overwrites a key. An overwrite refreshes recency but does
    /// not advance the access count. Returns `false` when the half has no
    /// capacity.
    pub fn put(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_back(id);
            return true;
        }

        if self.index.len() >= self.capacity {
            self.evict_least_recent();
        }
        let id = self.list.push_back(Entry {
            key: key.clone(),
            value,
            hits: 1,
        });
        self.index.insert(key, id);
        true
    }

    /// Consumes a ghost hit: returns `true` and forgets the key if it was in
    /// the ghost list.
    pub fn check_ghost(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    /// Grows the half (and its ghost) by one slot.
    pub fn increase_capacity(&mut self) {
        self.capacity += 1;
        let ghost_capacity = self.ghost.capacity();
        self.ghost.set_capacity(ghost_capacity + 1);
    }

    /// Shrinks the half (and its ghost) by one slot, evicting first if the
    /// half is full. Returns `false` if the half is already at zero.
    pub fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.index.len() >= self.capacity {
            self.evict_least_recent();
        }
        self.capacity -= 1;
        let ghost_capacity = self.ghost.capacity();
        self.ghost.set_capacity(ghost_capacity.saturating_sub(1));
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    fn evict_least_recent(&mut self) {
        if let Some(entry) = self.list.pop_front() {
            self.index.remove(&entry.key);
            self.ghost.record(entry.key);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.list.len());
        assert!(self.index.len() <= self.capacity);
        self.list.debug_validate_invariants();
        self.ghost.debug_validate_invariants();
        for key in self.index.keys() {
            assert!(!self.ghost.contains(key), "key in both main and ghost");
        }
    }
}

// ---------------------------------------------------------------------------
// Frequency half
// ---------------------------------------------------------------------------

/// Frequency side of ARC: a bucketed LFU whose evictions feed a FIFO ghost
/// of the same capacity.
#[derive(Debug)]
pub struct ArcLfuPart<K, V> {
    order: FrequencyBuckets<K>,
    values: FxHashMap<K, V>,
    ghost: GhostList<K>,
    capacity: usize,
}

impl<K, V> ArcLfuPart<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        ArcLfuPart {
            order: FrequencyBuckets::new(),
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ghost: GhostList::new(capacity),
            capacity,
        }
    }

    /// Looks up a key, bumping its frequency on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.order.touch(key);
        self.values.get(key)
    }

    /// Inserts or overwrites a key. Unlike the standalone LFU, an overwrite
    /// counts as an access and bumps the frequency. Returns `false` when the
    /// half has no capacity.
    pub fn put(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if let Some(existing) = self.values.get_mut(&key) {
            *existing = value;
            self.order.touch(&key);
            return true;
        }

        if self.values.len() >= self.capacity {
            self.evict_least_frequent();
        }
        self.order.insert(key.clone());
        self.values.insert(key, value);
        true
    }

    /// Consumes a ghost hit: returns `true` and forgets the key if it was in
    /// the ghost list.
    pub fn check_ghost(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    /// Grows the half (and its ghost) by one slot.
    pub fn increase_capacity(&mut self) {
        self.capacity += 1;
        let ghost_capacity = self.ghost.capacity();
        self.ghost.set_capacity(ghost_capacity + 1);
    }

    /// Shrinks the half (and its ghost) by one slot, evicting first if the
    /// half is full. Returns `false` if the half is already at zero.
    pub fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.values.len() >= self.capacity {
            self.evict_least_frequent();
        }
        self.capacity -= 1;
        let ghost_capacity = self.ghost.capacity();
        self.ghost.set_capacity(ghost_capacity.saturating_sub(1));
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    /// Returns the frequency of a resident key.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.order.frequency(key)
    }

    fn evict_least_frequent(&mut self) {
        if let Some((key, _)) = self.order.pop_min() {
            self.values.remove(&key);
            self.ghost.record(key);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.order.len(), self.values.len());
        assert!(self.values.len() <= self.capacity);
        self.order.debug_validate_invariants();
        self.ghost.debug_validate_invariants();
        for key in self.values.keys() {
            assert!(!self.ghost.contains(key), "key in both main and ghost");
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Adaptive replacement cache built from a recency half and a frequency
/// half, each constructed at the full configured capacity.
///
/// # Example
///
/// ```
/// use cachemgr::policy::arc::ArcCore;
///
/// let mut cache = ArcCore::new(2);
/// cache.insert(1, "a");
///
/// // First hit on the recency side reaches the transform threshold (2) and
/// // copies the entry into the frequency side.
/// assert_eq!(cache.get(&1), Some("a"));
/// assert!(cache.frequent_len() > 0);
/// ```
#[derive(Debug)]
pub struct ArcCore<K, V> {
    recent: ArcLruPart<K, V>,
    frequent: ArcLfuPart<K, V>,
    capacity: usize,
    transform_threshold: u64,
}

impl<K, V> ArcCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an ARC cache with the default transform threshold of 2.
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_TRANSFORM_THRESHOLD)
    }

    /// Creates an ARC cache promoting LRU-half entries once their access
    /// count reaches `transform_threshold`.
    pub fn with_threshold(capacity: usize, transform_threshold: u64) -> Self {
        ArcCore {
            recent: ArcLruPart::new(capacity, transform_threshold),
            frequent: ArcLfuPart::new(capacity),
            capacity,
            transform_threshold,
        }
    }

    /// Inserts a key-value pair.
    ///
    /// The pair always lands in the recency half; if the key is also
    /// resident in the frequency half, that copy is refreshed too.
    pub fn insert(&mut self, key: K, value: V) {
        self.adapt_on_ghost_hit(&key);

        let in_frequent = self.frequent.contains(&key);
        if in_frequent {
            self.recent.put(key.clone(), value.clone());
            self.frequent.put(key, value);
        } else {
            self.recent.put(key, value);
        }
    }

    /// Looks up a key, returning a copy of its value.
    ///
    /// A recency-side hit that reaches the transform threshold also copies
    /// the entry into the frequency side.
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.adapt_on_ghost_hit(key);

        if let Some((value, promote)) = self.recent.get(key) {
            let value = value.clone();
            if promote {
                self.frequent.put(key.clone(), value.clone());
            }
            return Some(value);
        }
        self.frequent.get(key).cloned()
    }

    /// Strict single-value lookup: a miss is an error, not an option.
    ///
    /// # Example
    ///
    /// ```
    /// use cachemgr::policy::arc::ArcCore;
    ///
    /// let mut cache = ArcCore::new(4);
    /// cache.insert(1, "a");
    /// assert_eq!(cache.try_get(&1), Ok("a"));
    /// assert!(cache.try_get(&2).is_err());
    /// ```
    pub fn try_get(&mut self, key: &K) -> Result<V, KeyNotFoundError> {
        self.get(key).ok_or(KeyNotFoundError)
    }

    /// Returns `true` if the key is resident in either half.
    pub fn contains(&self, key: &K) -> bool {
        self.recent.contains(key) || self.frequent.contains(key)
    }

    /// Returns the total number of resident entries across both halves.
    /// A key resident in both halves counts twice.
    pub fn len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    /// Returns `true` if both halves are empty.
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty() && self.frequent.is_empty()
    }

    /// Returns the configured (per-half) capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured transform threshold.
    pub fn transform_threshold(&self) -> u64 {
        self.transform_threshold
    }

    /// Current capacity of the recency half.
    pub fn recent_capacity(&self) -> usize {
        self.recent.capacity()
    }

    /// Current capacity of the frequency half.
    pub fn frequent_capacity(&self) -> usize {
        self.frequent.capacity()
    }

    /// Number of entries in the recency half.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Number of entries in the frequency half.
    pub fn frequent_len(&self) -> usize {
        self.frequent.len()
    }

    /// Number of keys in the recency half's ghost list.
    pub fn recent_ghost_len(&self) -> usize {
        self.recent.ghost_len()
    }

    /// Number of keys in the frequency half's ghost list.
    pub fn frequent_ghost_len(&self) -> usize {
        self.frequent.ghost_len()
    }

    // A ghost hit means the evicting half was under-provisioned. Shift one
    // unit of capacity toward it, but only if the other half can donate;
    // the total across both halves stays constant.
    fn adapt_on_ghost_hit(&mut self, key: &K) {
        if self.recent.check_ghost(key) {
            if self.frequent.decrease_capacity() {
                self.recent.increase_capacity();
            }
        } else if self.frequent.check_ghost(key) {
            if self.recent.decrease_capacity() {
                self.frequent.increase_capacity();
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.recent.debug_validate_invariants();
        self.frequent.debug_validate_invariants();
        assert_eq!(
            self.recent.capacity() + self.frequent.capacity(),
            self.capacity * 2,
            "capacity transfer must conserve the total"
        );
    }
}

/// Thread-safe ARC cache; one exclusive lock per instance.
///
/// # Example
///
/// ```
/// use cachemgr::policy::arc::ConcurrentArcCache;
///
/// let cache = ConcurrentArcCache::new(16);
/// cache.insert("k", 1u64);
/// assert_eq!(cache.get(&"k"), Some(1));
/// assert!(cache.try_get(&"absent").is_err());
/// ```
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentArcCache<K, V> {
    inner: Arc<Mutex<ArcCore<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a thread-safe ARC cache with the default transform threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_TRANSFORM_THRESHOLD)
    }

    /// Creates a thread-safe ARC cache with an explicit transform threshold.
    pub fn with_threshold(capacity: usize, transform_threshold: u64) -> Self {
        ConcurrentArcCache {
            inner: Arc::new(Mutex::new(ArcCore::with_threshold(
                capacity,
                transform_threshold,
            ))),
        }
    }

    /// Inserts a key-value pair; see [`ArcCore::insert`].
    pub fn insert(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    /// Looks up a key, returning a copy of its value.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Strict lookup; a miss is a [`KeyNotFoundError`].
    pub fn try_get(&self, key: &K) -> Result<V, KeyNotFoundError> {
        self.inner.lock().try_get(key)
    }

    /// Returns `true` if the key is resident in either half.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Returns the total number of resident entries across both halves.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if both halves are empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the configured (per-half) capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentArcCache")
            .field("recent_len", &cache.recent_len())
            .field("frequent_len", &cache.frequent_len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentArcCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
}
