//! Unified cache builder over the single-threaded policy cores.
//!
//! Lets callers pick a policy at runtime behind one concrete type, with
//! parameter validation up front instead of surprising behavior later.
//!
//! ## Example
//!
//! ```
//! use cachemgr::builder::{CacheBuilder, CachePolicy};
//! use cachemgr::traits::CoreCache;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .try_build::<u64, String>(CachePolicy::Lru)
//!     .unwrap();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::lfu::LfuCore;
use crate::policy::lfu_avg::LfuAvgCore;
use crate::policy::lru::LruCore;
use crate::policy::lru_k::LrukCore;
use crate::traits::CoreCache;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    Lru,
    /// LRU with an admission filter requiring `k` observations.
    LruK { k: u64 },
    /// Least Frequently Used eviction (bucket-based).
    Lfu,
    /// LFU with average-frequency aging above `max_avg_freq`.
    LfuAvg { max_avg_freq: u64 },
}

/// Builder carrying the shared sizing parameters.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    history_capacity: Option<usize>,
}

impl CacheBuilder {
    /// Starts a builder for caches of the given capacity.
    pub fn new(capacity: usize) -> Self {
        CacheBuilder {
            capacity,
            history_capacity: None,
        }
    }

    /// Sets the history capacity used by [`CachePolicy::LruK`].
    ///
    /// Defaults to twice the main capacity: the admission filter should
    /// remember more keys than it admits to be worth having.
    pub fn history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = Some(history_capacity);
        self
    }

    /// Builds a cache for the chosen policy, validating its parameters.
    pub fn try_build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(LruCore::new(self.capacity)),
            CachePolicy::LruK { k } => {
                if k == 0 {
                    return Err(ConfigError::ZeroAdmissionThreshold);
                }
                let history = self.history_capacity.unwrap_or(self.capacity * 2);
                CacheInner::LruK(LrukCore::with_k(self.capacity, history, k))
            }
            CachePolicy::Lfu => CacheInner::Lfu(LfuCore::new(self.capacity)),
            CachePolicy::LfuAvg { max_avg_freq } => {
                if max_avg_freq == 0 {
                    return Err(ConfigError::ZeroAgingCeiling);
                }
                CacheInner::LfuAvg(LfuAvgCore::with_max_avg_freq(self.capacity, max_avg_freq))
            }
        };
        Ok(Cache { inner })
    }
}

/// Policy-erased cache produced by [`CacheBuilder`].
#[derive(Debug)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: CacheInner<K, V>,
}

#[derive(Debug)]
enum CacheInner<K, V>
where
    K: Eq + Hash + Clone,
{
    Lru(LruCore<K, V>),
    LruK(LrukCore<K, V>),
    Lfu(LfuCore<K, V>),
    LfuAvg(LfuAvgCore<K, V>),
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(cache) => cache.insert(key, value),
            CacheInner::LruK(cache) => cache.insert(key, value),
            CacheInner::Lfu(cache) => cache.insert(key, value),
            CacheInner::LfuAvg(cache) => cache.insert(key, value),
        }
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::Lru(cache) => cache.get(key),
            CacheInner::LruK(cache) => cache.get(key),
            CacheInner::Lfu(cache) => cache.get(key),
            CacheInner::LfuAvg(cache) => cache.get(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(cache) => cache.contains(key),
            CacheInner::LruK(cache) => cache.contains(key),
            CacheInner::Lfu(cache) => cache.contains(key),
            CacheInner::LfuAvg(cache) => cache.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.len(),
            CacheInner::LruK(cache) => cache.len(),
            CacheInner::Lfu(cache) => cache.len(),
            CacheInner::LfuAvg(cache) => cache.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.capacity(),
            CacheInner::LruK(cache) => cache.capacity(),
            CacheInner::Lfu(cache) => cache.capacity(),
            CacheInner::LfuAvg(cache) => cache.capacity(),
        }
    }

    fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(cache) => cache.clear(),
            CacheInner::LruK(cache) => cache.clear(),
            CacheInner::Lfu(cache) => cache.clear(),
            CacheInner::LfuAvg(cache) => cache.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_creates_each_policy() {
        for policy in [
            CachePolicy::Lru,
            CachePolicy::LruK { k: 1 },
            CachePolicy::Lfu,
            CachePolicy::LfuAvg { max_avg_freq: 10 },
        ] {
            let mut cache = CacheBuilder::new(4).try_build::<u32, u32>(policy).unwrap();
            cache.insert(1, 10);
            assert_eq!(cache.get(&1), Some(&10));
            assert_eq!(cache.capacity(), 4);
            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn builder_rejects_zero_k() {
        let err = CacheBuilder::new(4)
            .try_build::<u32, u32>(CachePolicy::LruK { k: 0 })
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroAdmissionThreshold);
    }

    #[test]
    fn builder_rejects_zero_aging_ceiling() {
        let err = CacheBuilder::new(4)
            .try_build::<u32, u32>(CachePolicy::LfuAvg { max_avg_freq: 0 })
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroAgingCeiling);
    }

    #[test]
    fn builder_lruk_uses_history_capacity() {
        let mut cache = CacheBuilder::new(4)
            .history_capacity(1)
            .try_build::<u32, u32>(CachePolicy::LruK { k: 2 })
            .unwrap();

        // With a one-slot history, observing key 2 forgets key 1's progress.
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(1, 10);
        assert!(!cache.contains(&1));
    }
}
