//! Coalescing Cache Module
//!
//! Memoizes the results of an expensive computation per key. A bounded LRU
//! store answers repeat lookups; concurrent misses for the same key are
//! coalesced so the computation runs at most once at a time per key.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{BoundedStore, CacheStats, FlightGroup};
use crate::config::Config;

// == Lookup ==
/// How a lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Served from the store without running anything
    Hit,
    /// This caller ran the computation
    Computed,
    /// Joined another caller's in-flight computation
    Joined,
}

// == Coalescing Cache ==
/// LRU cache of computation results with single-flight coalescing.
///
/// Both successes and errors are cached: a failed computation is returned
/// to later callers without being retried until its entry is evicted,
/// removed or expires.
///
/// The store lock is held only to read or write the store. Computations and
/// the wait for an in-flight computation happen outside it, so misses on
/// distinct keys run in parallel.
///
/// Each computation runs on its own Tokio task. A caller that stops waiting
/// (timeout, `select!`, abort) does not cancel it: the result is still
/// stored and delivered to every caller that joined.
///
/// # Example
/// ```
/// use coalesce_cache::CoalescingCache;
///
/// # tokio_test::block_on(async {
/// let cache: CoalescingCache<String, u64, String> = CoalescingCache::new(128).unwrap();
///
/// let first = cache.get("answer".to_string(), || async { Ok(42) }).await;
/// let second = cache.get("answer".to_string(), || async { Ok(0) }).await;
///
/// assert_eq!(first, Ok(42));
/// assert_eq!(second, Ok(42));
/// # });
/// ```
#[derive(Debug)]
pub struct CoalescingCache<K: Hash + Eq, V, E> {
    store: Arc<Mutex<BoundedStore<K, V, E>>>,
    flights: FlightGroup<K, (Result<V, E>, Lookup)>,
}

impl<K, V, E> CoalescingCache<K, V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache holding at most `max_entries` results, without TTL.
    pub fn new(max_entries: usize) -> crate::error::Result<Self> {
        Self::with_ttl(max_entries, None)
    }

    /// Creates a cache whose entries also expire after `ttl`.
    pub fn with_ttl(max_entries: usize, ttl: Option<Duration>) -> crate::error::Result<Self> {
        Ok(Self {
            store: Arc::new(Mutex::new(BoundedStore::new(max_entries, ttl)?)),
            flights: FlightGroup::new(),
        })
    }

    /// Creates a cache from validated configuration.
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        config.validate()?;
        Self::with_ttl(config.max_entries, config.ttl())
    }

    // == Get ==
    /// Returns the cached result for `key`, running `compute` on a miss.
    ///
    /// Concurrent callers missing on the same key share a single run of one
    /// caller's `compute` and all receive its result.
    ///
    /// # Panics
    /// Must be called within a Tokio runtime. A panic in `compute` is resumed
    /// in the caller that supplied it; callers that joined retry instead.
    pub async fn get<F, Fut>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.get_with_outcome(key, compute).await.0
    }

    /// Like [`get`](Self::get), also reporting how the lookup was answered.
    pub async fn get_with_outcome<F, Fut>(&self, key: K, compute: F) -> (Result<V, E>, Lookup)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        if let Some(found) = self.store.lock().get(&key) {
            return (found, Lookup::Hit);
        }

        let store = Arc::clone(&self.store);
        let store_key = key.clone();
        let ((result, outcome), shared) = self
            .flights
            .run(key, move || Self::fill(store, store_key, compute))
            .await;

        if shared {
            self.store.lock().stats_mut().record_coalesced();
            debug!("Lookup coalesced onto in-flight computation");
            return (result, Lookup::Joined);
        }
        (result, outcome)
    }

    /// Leader path: recheck the store, compute on a second miss, store the
    /// result before it is published to waiters.
    async fn fill<F, Fut>(
        store: Arc<Mutex<BoundedStore<K, V, E>>>,
        key: K,
        compute: F,
    ) -> (Result<V, E>, Lookup)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // A flight for this key may have finished since the caller's miss,
        // which is already counted
        let refreshed = store.lock().peek(&key);
        if let Some(found) = refreshed {
            return (found, Lookup::Hit);
        }

        debug!("Cache miss, running computation");
        let result = compute().await;

        let mut store = store.lock();
        store.stats_mut().record_computation();
        if result.is_err() {
            debug!("Caching failed computation result");
        }
        store.insert(key, result.clone());

        (result, Lookup::Computed)
    }

    // == Store Management ==
    /// Returns the cached result without touching recency or statistics.
    pub fn peek(&self, key: &K) -> Option<Result<V, E>> {
        self.store.lock().peek(key)
    }

    /// Checks for a live cached result without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.store.lock().contains(key)
    }

    /// Drops the cached result for `key`, returning whether one was present.
    ///
    /// An in-flight computation for the key is unaffected and will store its
    /// result when it finishes.
    pub fn remove(&self, key: &K) -> bool {
        self.store.lock().remove(key)
    }

    /// Drops every cached result.
    pub fn purge(&self) {
        self.store.lock().clear();
    }

    /// Detaches an in-flight computation so the next caller starts afresh.
    pub fn forget(&self, key: &K) -> bool {
        self.flights.forget(key)
    }

    /// Removes entries whose TTL has elapsed, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    /// Number of keys with a computation currently running.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }
}
