//! # Hash-sharded cache wrappers
//!
//! A single policy instance serializes every operation behind one lock, so
//! under heavy multi-threaded load the lock becomes the bottleneck long
//! before the data structures do. The sharded wrappers partition the
//! keyspace across `N` independent caches, each with its own lock:
//!
//! ```text
//!                       ┌──────────────────────────────┐
//!        key ─────────► │     FxHash(key) mod N        │
//!                       └──────────────┬───────────────┘
//!                                      ▼
//!   ┌─────────────┬─────────────┬─────────────┬─────────────┐
//!   │  shard 0    │  shard 1    │  shard 2    │  shard 3    │
//!   │  cache+lock │  cache+lock │  cache+lock │  cache+lock │
//!   └─────────────┴─────────────┴─────────────┴─────────────┘
//! ```
//!
//! Each shard holds `ceil(C / N)` entries, so the aggregate may exceed `C`
//! by up to `N - 1`; that overshoot is the price of independence. A key only
//! ever lives in the shard its hash selects, and no operation spans shards,
//! so there is no global lock and no cross-shard ordering guarantee.
//!
//! `n_shards = 0` selects the platform's concurrency hint
//! (`std::thread::available_parallelism`), falling back to 1 when unknown.
//!
//! [`ShardedLruCache`] shards plain LRU slices. [`ShardedLfuCache`] shards
//! aging LFU slices ([`LfuAvgCore`](crate::policy::lfu_avg::LfuAvgCore))
//! with a deliberately low default ceiling, so per-shard hotspots decay.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::thread;

use rustc_hash::FxHasher;

use crate::policy::lfu_avg::ConcurrentLfuAvgCache;
use crate::policy::lru::ConcurrentLruCache;
use crate::traits::ConcurrentCache;

/// Default aging ceiling for the sharded LFU slices.
pub const DEFAULT_SHARD_MAX_AVG_FREQ: u64 = 10;

// Routing uses the same FxHash the shard indexes hash with; the modulus
// picks the owning shard. Must stay stable for a cache's lifetime or keys
// would migrate between shards.
fn shard_of<K: Hash>(key: &K, shards: usize) -> usize {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % shards
}

fn resolve_shard_count(n_shards: usize) -> usize {
    if n_shards > 0 {
        n_shards
    } else {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
}

fn slice_capacity(capacity: usize, shards: usize) -> usize {
    capacity.div_ceil(shards)
}

// ---------------------------------------------------------------------------
// Sharded LRU
// ---------------------------------------------------------------------------

/// LRU cache partitioned into independently locked shards.
///
/// # Example
///
/// ```
/// use cachemgr::policy::sharded::ShardedLruCache;
///
/// let cache = ShardedLruCache::new(1024, 8);
/// cache.insert(1u64, "a");
/// assert_eq!(cache.get(&1), Some("a"));
/// assert_eq!(cache.shard_count(), 8);
/// ```
pub struct ShardedLruCache<K, V> {
    shards: Vec<ConcurrentLruCache<K, V>>,
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a sharded LRU cache of total capacity `capacity` split over
    /// `n_shards` shards (0 = platform concurrency hint).
    pub fn new(capacity: usize, n_shards: usize) -> Self {
        let shards = resolve_shard_count(n_shards);
        let slice = slice_capacity(capacity, shards);
        ShardedLruCache {
            shards: (0..shards).map(|_| ConcurrentLruCache::new(slice)).collect(),
        }
    }

    /// Inserts a key-value pair into the key's shard.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.shard_for(&key).insert(key, value)
    }

    /// Looks up a key in its shard, returning a clone of the value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard_for(key).get(key)
    }

    /// Single-value lookup returning `V::default()` on a miss.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Removes a key from its shard.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard_for(key).remove(key)
    }

    /// Returns `true` if the key is resident in its shard.
    pub fn contains(&self, key: &K) -> bool {
        self.shard_for(key).contains(key)
    }

    /// Returns the total number of entries across all shards.
    ///
    /// The sum is taken shard by shard without a global lock, so it is a
    /// point-in-time approximation under concurrent writes.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Returns `true` if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// Returns the aggregate capacity (per-shard capacity times shards).
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(|shard| shard.capacity()).sum()
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the number of entries in one shard.
    pub fn shard_len(&self, shard: usize) -> usize {
        self.shards[shard].len()
    }

    /// Returns the index of the shard that owns `key`.
    pub fn shard_index(&self, key: &K) -> usize {
        shard_of(key, self.shards.len())
    }

    /// Removes all entries from every shard.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }

    fn shard_for(&self, key: &K) -> &ConcurrentLruCache<K, V> {
        &self.shards[self.shard_index(key)]
    }
}

impl<K, V> fmt::Debug for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shards", &self.shards.len())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> ConcurrentCache for ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

// ---------------------------------------------------------------------------
// Sharded LFU
// ---------------------------------------------------------------------------

/// Aging-LFU cache partitioned into independently locked shards.
///
/// # Example
///
/// ```
/// use cachemgr::policy::sharded::ShardedLfuCache;
///
/// let cache = ShardedLfuCache::new(256, 4);
/// cache.insert("hot", 1u32);
/// assert_eq!(cache.get(&"hot"), Some(1));
/// ```
pub struct ShardedLfuCache<K, V> {
    shards: Vec<ConcurrentLfuAvgCache<K, V>>,
}

impl<K, V> ShardedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a sharded LFU cache with the default per-shard aging ceiling.
    pub fn new(capacity: usize, n_shards: usize) -> Self {
        Self::with_max_avg_freq(capacity, n_shards, DEFAULT_SHARD_MAX_AVG_FREQ)
    }

    /// Creates a sharded LFU cache with an explicit per-shard aging ceiling.
    pub fn with_max_avg_freq(capacity: usize, n_shards: usize, max_avg_freq: u64) -> Self {
        let shards = resolve_shard_count(n_shards);
        let slice = slice_capacity(capacity, shards);
        ShardedLfuCache {
            shards: (0..shards)
                .map(|_| ConcurrentLfuAvgCache::with_max_avg_freq(slice, max_avg_freq))
                .collect(),
        }
    }

    /// Inserts a key-value pair into the key's shard.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.shard_for(&key).insert(key, value)
    }

    /// Looks up a key in its shard, returning a clone of the value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard_for(key).get(key)
    }

    /// Single-value lookup returning `V::default()` on a miss.
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Returns `true` if the key is resident in its shard.
    pub fn contains(&self, key: &K) -> bool {
        self.shard_for(key).contains(key)
    }

    /// Returns the total number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Returns `true` if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// Returns the aggregate capacity (per-shard capacity times shards).
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(|shard| shard.capacity()).sum()
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the number of entries in one shard.
    pub fn shard_len(&self, shard: usize) -> usize {
        self.shards[shard].len()
    }

    /// Returns the index of the shard that owns `key`.
    pub fn shard_index(&self, key: &K) -> usize {
        shard_of(key, self.shards.len())
    }

    /// Clears every shard and resets its frequency accounting.
    pub fn purge(&self) {
        for shard in &self.shards {
            shard.purge();
        }
    }

    fn shard_for(&self, key: &K) -> &ConcurrentLfuAvgCache<K, V> {
        &self.shards[self.shard_index(key)]
    }
}

impl<K, V> fmt::Debug for ShardedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLfuCache")
            .field("shards", &self.shards.len())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> ConcurrentCache for ShardedLfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}
