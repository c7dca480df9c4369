//! Frequency-ordered key index used by the LFU policies.

use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Entry<K> {
    key: K,
    freq: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

// Buckets form a second linked chain keyed by frequency so that the next
// non-empty frequency is always known without scanning.
#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Per-frequency lists of keys with an incrementally maintained minimum.
///
/// Each bucket holds its keys in admission order (head = oldest), so
/// `pop_min` evicts the oldest key of the lowest non-empty frequency.
/// `min_freq` is 0 exactly when the structure is empty.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    entries: SlotArena<Entry<K>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }

    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Returns the oldest key at the lowest frequency without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let bucket = self.buckets.get(&self.min_freq)?;
        let id = bucket.head?;
        let entry = self.entries.get(id)?;
        Some((&entry.key, entry.freq))
    }

    /// Admits `key` at frequency 1; returns `false` if it is already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let id = self.entries.insert(Entry {
            key: key.clone(),
            freq: 1,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);

        if !self.buckets.contains_key(&1) {
            let next = if self.min_freq == 0 {
                None
            } else {
                Some(self.min_freq)
            };
            self.link_bucket(1, None, next);
        }

        self.push_tail(1, id);
        if self.min_freq == 0 || self.min_freq > 1 {
            self.min_freq = 1;
        }
        true
    }

    /// Bumps the frequency of `key` by one and re-appends it at the newest
    /// position of its new bucket. Returns the new frequency.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let freq = self.entries.get(id)?.freq;
        if freq == u64::MAX {
            // Saturated counter: refresh recency within the bucket only.
            self.unlink(freq, id)?;
            self.push_tail(freq, id);
            return Some(freq);
        }
        let next_freq = freq + 1;

        let (bucket_prev, bucket_next) = {
            let bucket = self.buckets.get(&freq)?;
            (bucket.prev, bucket.next)
        };

        self.unlink(freq, id)?;
        let emptied = self.bucket_is_empty(freq);

        if emptied {
            self.unlink_bucket(freq, bucket_prev, bucket_next);
            if self.min_freq == freq {
                self.min_freq = bucket_next.unwrap_or(0);
            }
        }

        if !self.buckets.contains_key(&next_freq) {
            let prev = if emptied { bucket_prev } else { Some(freq) };
            self.link_bucket(next_freq, prev, bucket_next);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = next_freq;
        }
        self.push_tail(next_freq, id);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }

        Some(next_freq)
    }

    /// Removes `key`, returning its frequency.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let id = self.index.remove(key)?;
        let freq = self.entries.get(id)?.freq;

        self.unlink(freq, id)?;
        if self.bucket_is_empty(freq) {
            let (prev, next) = {
                let bucket = self.buckets.get(&freq)?;
                (bucket.prev, bucket.next)
            };
            self.unlink_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }

        self.entries.remove(id).map(|entry| entry.freq)
    }

    /// Removes and returns the oldest key at the lowest frequency.
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let freq = self.min_freq;
        let id = self.buckets.get(&freq)?.head?;

        self.unlink(freq, id)?;
        if self.bucket_is_empty(freq) {
            let (prev, next) = {
                let bucket = self.buckets.get(&freq)?;
                (bucket.prev, bucket.next)
            };
            self.unlink_bucket(freq, prev, next);
            self.min_freq = next.unwrap_or(0);
        }

        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.freq))
    }

    /// Lowers every frequency by `decrement` (floor 1), rebuilds the buckets
    /// and recomputes `min_freq`. Returns the new sum of all frequencies.
    ///
    /// Relative order is preserved: entries are re-grouped lowest frequency
    /// first, oldest first, so survivors of the same new bucket keep their
    /// old eviction order.
    pub fn age(&mut self, decrement: u64) -> u64 {
        if self.entries.is_empty() {
            return 0;
        }
        if decrement == 0 {
            return self.entries.iter().map(|(_, entry)| entry.freq).sum();
        }

        let mut ordered = Vec::with_capacity(self.entries.len());
        let mut cursor = if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        };
        while let Some(freq) = cursor {
            let bucket = self.buckets.get(&freq).expect("chained bucket missing");
            let mut node = bucket.head;
            while let Some(id) = node {
                ordered.push(id);
                node = self.entries.get(id).and_then(|entry| entry.next);
            }
            cursor = bucket.next;
        }

        self.buckets.clear();
        self.min_freq = 0;

        let mut total = 0u64;
        let mut regrouped: BTreeMap<u64, Vec<SlotId>> = BTreeMap::new();
        for id in ordered {
            let entry = self.entries.get_mut(id).expect("aged entry missing");
            entry.freq = entry.freq.saturating_sub(decrement).max(1);
            entry.prev = None;
            entry.next = None;
            total += entry.freq;
            regrouped.entry(entry.freq).or_default().push(id);
        }

        let mut prev_freq = None;
        for (&freq, ids) in &regrouped {
            self.link_bucket(freq, prev_freq, None);
            for &id in ids {
                self.push_tail(freq, id);
            }
            prev_freq = Some(freq);
        }
        self.min_freq = regrouped.keys().next().copied().unwrap_or(0);

        total
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.len(), self.index.len());

        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }

        assert!(self.min_freq > 0);
        assert!(self.buckets.contains_key(&self.min_freq));

        for (&freq, bucket) in &self.buckets {
            assert!(bucket.head.is_some());
            assert!(bucket.tail.is_some());
            if let Some(prev) = bucket.prev {
                assert!(prev < freq);
                assert_eq!(self.buckets[&prev].next, Some(freq));
            } else {
                assert_eq!(self.min_freq, freq);
            }
            if let Some(next) = bucket.next {
                assert!(next > freq);
                assert_eq!(self.buckets[&next].prev, Some(freq));
            }

            let mut current = bucket.head;
            let mut last = None;
            let mut count = 0usize;
            while let Some(id) = current {
                let entry = self.entries.get(id).expect("bucket entry missing");
                assert_eq!(entry.freq, freq);
                assert_eq!(entry.prev, last);
                assert_eq!(self.index.get(&entry.key), Some(&id));
                last = Some(id);
                current = entry.next;
                count += 1;
            }
            assert_eq!(bucket.tail, last);
            assert!(count > 0);
        }
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .map(|bucket| bucket.head.is_none())
            .unwrap_or(true)
    }

    fn link_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );

        if let Some(prev) = prev {
            if let Some(prev_bucket) = self.buckets.get_mut(&prev) {
                prev_bucket.next = Some(freq);
            }
        }
        if let Some(next) = next {
            if let Some(next_bucket) = self.buckets.get_mut(&next) {
                next_bucket.prev = Some(freq);
            }
        }
    }

    fn unlink_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev) = prev {
            if let Some(prev_bucket) = self.buckets.get_mut(&prev) {
                prev_bucket.next = next;
            }
        }
        if let Some(next) = next {
            if let Some(next_bucket) = self.buckets.get_mut(&next) {
                next_bucket.prev = prev;
            }
        }
        self.buckets.remove(&freq);
    }

    fn push_tail(&mut self, freq: u64, id: SlotId) {
        let bucket = self.buckets.get_mut(&freq).expect("bucket missing");

        let old_tail = bucket.tail;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = old_tail;
            entry.next = None;
        }
        match old_tail {
            Some(old_tail) => {
                if let Some(entry) = self.entries.get_mut(old_tail) {
                    entry.next = Some(id);
                }
            }
            None => bucket.head = Some(id),
        }
        bucket.tail = Some(id);
    }

    fn unlink(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let entry = self.entries.get(id)?;
            (entry.prev, entry.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        match prev {
            Some(prev) => {
                if let Some(entry) = self.entries.get_mut(prev) {
                    entry.next = next;
                }
            }
            None => bucket.head = next,
        }
        match next {
            Some(next) => {
                if let Some(entry) = self.entries.get_mut(next) {
                    entry.prev = prev;
                }
            }
            None => bucket.tail = prev,
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }

        Some(())
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
