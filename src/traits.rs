//! # Cache Trait Hierarchy
//!
//! Defines the shared interface the eviction policies implement, so callers
//! can be written against a policy-agnostic bound and swap policies freely.
//!
//! ```text
//!            ┌─────────────────────────────────────────┐
//!            │            CoreCache<K, V>              │
//!            │                                         │
//!            │  insert(&mut, K, V) → Option<V>         │
//!            │  get(&mut, &K) → Option<&V>             │
//!            │  contains(&, &K) → bool                 │
//!            │  len(&) / is_empty(&) / capacity(&)     │
//!            │  clear(&mut)                            │
//!            └──────────────────┬──────────────────────┘
//!                               │
//!                               ▼
//!            ┌─────────────────────────────────────────┐
//!            │          MutableCache<K, V>             │
//!            │                                         │
//!            │  remove(&K) → Option<V>                 │
//!            └─────────────────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait             | Extends        | Implemented by                        |
//! |-------------------|----------------|---------------------------------------|
//! | `CoreCache`       | -              | all policy cores                      |
//! | `MutableCache`    | `CoreCache`    | `LruCore`, `LrukCore` (arbitrary      |
//! |                   |                | removal is part of their contract)    |
//! | `ConcurrentCache` | `Send + Sync`  | the lock-based wrappers               |
//!
//! The LFU cores expose `purge` instead of trait-level removal, and the ARC
//! core keeps an inherent API: its dual-half layout gives `insert` and `get`
//! semantics (promotion, ghost feedback) that the flat trait contract cannot
//! describe honestly.
//!
//! ## Thread Safety
//!
//! Core types are single-threaded (`&mut self`). The `Concurrent*` wrappers
//! in `policy::*` serialize every public operation behind one exclusive lock
//! per instance and carry the [`ConcurrentCache`] marker.

/// Core cache operations that every policy supports.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lru::LruCore;
/// use cachemgr::traits::CoreCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruCore::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key
    /// already existed.
    ///
    /// At capacity, an entry may first be evicted according to the policy.
    /// With capacity 0 the insert is a silent no-op.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up a value by key.
    ///
    /// A hit updates policy state (recency order, frequency counter); use
    /// [`contains`](Self::contains) to probe without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks whether a key is resident without updating policy state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries this cache may hold.
    fn capacity(&self) -> usize;

    /// Removes all entries and resets policy bookkeeping.
    fn clear(&mut self);
}

/// Caches that support removal of arbitrary keys.
///
/// # Example
///
/// ```
/// use cachemgr::policy::lru::LruCore;
/// use cachemgr::traits::{CoreCache, MutableCache};
///
/// fn invalidate<C: MutableCache<u64, &'static str>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = LruCore::new(10);
/// cache.insert(1, "one");
/// cache.insert(2, "two");
/// invalidate(&mut cache, &[1]);
/// assert!(!cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was resident. Removing an
    /// absent key is a no-op.
    fn remove(&mut self, key: &K) -> Option<V>;
}

/// Marker trait for caches that are safe to use concurrently.
///
/// Implementors serialize each public operation internally; callers may share
/// them across threads without external locking.
pub trait ConcurrentCache: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapCache {
        data: Vec<(u32, String)>,
        capacity: usize,
    }

    impl CoreCache<u32, String> for MapCache {
        fn insert(&mut self, key: u32, value: String) -> Option<String> {
            if let Some((_, existing)) = self.data.iter_mut().find(|(k, _)| *k == key) {
                return Some(std::mem::replace(existing, value));
            }
            if self.data.len() >= self.capacity {
                self.data.remove(0);
            }
            self.data.push((key, value));
            None
        }

        fn get(&mut self, key: &u32) -> Option<&String> {
            self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
        }

        fn contains(&self, key: &u32) -> bool {
            self.data.iter().any(|(k, _)| k == key)
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn capacity(&self) -> usize {
            self.capacity
        }

        fn clear(&mut self) {
            self.data.clear();
        }
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut cache = MapCache {
            data: Vec::new(),
            capacity: 2,
        };

        assert_eq!(cache.insert(1, "first".to_string()), None);
        assert_eq!(
            cache.insert(1, "second".to_string()),
            Some("first".to_string())
        );
        assert_eq!(cache.get(&1), Some(&"second".to_string()));
        assert!(!cache.is_empty());
    }
}
