//! Operation counters for the policy cores (feature `metrics`).
//!
//! Counters are plain integers updated inside the policy's own critical
//! section, so enabling them adds no extra synchronization. Snapshots are
//! cheap copies suitable for periodic export.

/// Mutable operation counters embedded in a policy core.
#[derive(Debug, Default)]
pub struct PolicyMetrics {
    get_hits: u64,
    get_misses: u64,
    inserts: u64,
    updates: u64,
    evictions: u64,
}

impl PolicyMetrics {
    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    #[inline]
    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Copies the counters into a snapshot together with the cache's current
    /// occupancy.
    pub(crate) fn snapshot(&self, len: usize, capacity: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            inserts: self.inserts,
            updates: self.updates,
            evictions: self.evictions,
            len,
            capacity,
        }
    }
}

/// Point-in-time copy of a policy's operation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Lookups that found the key.
    pub get_hits: u64,
    /// Lookups that missed.
    pub get_misses: u64,
    /// Inserts that admitted a new entry.
    pub inserts: u64,
    /// Inserts that overwrote an existing entry.
    pub updates: u64,
    /// Entries displaced by capacity pressure.
    pub evictions: u64,
    /// Entries resident at snapshot time.
    pub len: usize,
    /// Configured capacity.
    pub capacity: usize,
}

impl MetricsSnapshot {
    /// Hit ratio over all lookups, or `None` before the first lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let total = self.get_hits + self.get_misses;
        if total == 0 {
            None
        } else {
            Some(self.get_hits as f64 / total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_copies_counters() {
        let mut metrics = PolicyMetrics::default();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        metrics.record_insert();
        metrics.record_update();
        metrics.record_eviction();

        let snapshot = metrics.snapshot(3, 10);
        assert_eq!(snapshot.get_hits, 2);
        assert_eq!(snapshot.get_misses, 1);
        assert_eq!(snapshot.inserts, 1);
        assert_eq!(snapshot.updates, 1);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.len, 3);
        assert_eq!(snapshot.capacity, 10);
    }

    #[test]
    fn hit_ratio_handles_no_lookups() {
        let metrics = PolicyMetrics::default();
        assert_eq!(metrics.snapshot(0, 4).hit_ratio(), None);

        let mut metrics = PolicyMetrics::default();
        metrics.record_hit();
        metrics.record_miss();
        assert_eq!(metrics.snapshot(1, 4).hit_ratio(), Some(0.5));
    }
}
