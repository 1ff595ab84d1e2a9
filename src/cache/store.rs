//! Cache Store Module
//!
//! Bounded storage engine combining an LRU map with TTL expiration and
//! statistics. Not synchronized: the coalescing cache wraps it in a mutex.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::error::CacheError;

// == Bounded Store ==
/// Fixed-capacity result store with least-recently-used eviction.
#[derive(Debug)]
pub struct BoundedStore<K: Hash + Eq, V, E> {
    /// Entries ordered from most to least recently used
    entries: LruCache<K, CacheEntry<V, E>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied to every inserted entry
    ttl: Option<Duration>,
}

impl<K: Hash + Eq, V: Clone, E: Clone> BoundedStore<K, V, E> {
    // == Constructor ==
    /// Creates a new BoundedStore with specified capacity and optional TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `ttl` - Lifetime of each entry, `None` keeps entries until evicted
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> crate::error::Result<Self> {
        let capacity =
            NonZeroUsize::new(max_entries).ok_or(CacheError::InvalidCapacity(max_entries))?;

        Ok(Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::new(),
            ttl,
        })
    }

    // == Get ==
    /// Retrieves a stored result by key and marks it most recently used.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get<Q>(&mut self, key: &Q) -> Option<Result<V, E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match self.entries.peek(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.pop(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let result = self.entries.get(key).map(|entry| entry.result.clone());
        self.stats.record_hit();
        result
    }

    // == Peek ==
    /// Returns a live stored result without touching recency or stats.
    pub fn peek<Q>(&self, key: &Q) -> Option<Result<V, E>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .peek(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.result.clone())
    }

    // == Insert ==
    /// Stores a result, replacing any previous one for the same key.
    ///
    /// If the store is at capacity the least recently used entry is evicted
    /// and its key returned. Replacing an existing key is not an eviction.
    pub fn insert(&mut self, key: K, result: Result<V, E>) -> Option<K> {
        let entry = CacheEntry::new(result, self.ttl);
        let evicted = match self.entries.push(key, entry) {
            // push hands back the old value when the key was already present
            Some((old_key, _)) if !self.entries.contains(&old_key) => {
                self.stats.record_eviction();
                debug!("Evicted least recently used entry");
                Some(old_key)
            }
            _ => None,
        };

        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Remove ==
    /// Removes an entry by key, returning whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.pop(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Removes every entry. Statistics counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Contains ==
    /// Checks for a live entry without touching recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize
    where
        K: Clone,
    {
        if self.ttl.is_none() {
            return 0;
        }

        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.entries.pop(&key);
        }

        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Mutable access for counters maintained outside the store.
    pub fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
