//! Flight Group Module
//!
//! Single-flight coalescing: concurrent callers asking for the same key share
//! one execution of the underlying work and all receive its result.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

type Registry<K, T> = Arc<Mutex<HashMap<K, Call<T>>>>;

/// Registered in-flight call: a generation tag plus a subscription to its
/// completion signal.
#[derive(Debug)]
struct Call<T> {
    generation: u64,
    done: watch::Receiver<Option<T>>,
}

/// What a caller does after consulting the registry.
enum Role<T> {
    Lead(u64, watch::Sender<Option<T>>),
    Wait(watch::Receiver<Option<T>>),
}

// == Flight Group ==
/// Registry of in-flight computations keyed by `K`.
///
/// The first caller for a key (the leader) starts the work on its own task.
/// Callers arriving while it runs subscribe to its completion signal instead
/// of starting new work. Once started, the work runs to completion even if
/// the leader or every waiter stops waiting. If the work panics, waiters
/// retry and one of them becomes the next leader.
#[derive(Debug)]
pub struct FlightGroup<K, T> {
    calls: Registry<K, T>,
    next_generation: AtomicU64,
}

impl<K, T> Default for FlightGroup<K, T>
where
    K: Hash + Eq + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> FlightGroup<K, T>
where
    K: Hash + Eq + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    // == Run ==
    /// Runs `work` for `key` unless a run for the same key is already in
    /// flight, in which case the caller waits for that run instead.
    ///
    /// Returns the result and whether it was shared from another caller's run.
    /// `work` is invoked at most once per call to `run`, never while the
    /// registry lock is held, and on a spawned task so that dropping the
    /// returned future does not cancel it.
    ///
    /// # Panics
    /// Must be called within a Tokio runtime. A panic inside `work` is
    /// resumed in the caller that supplied it.
    pub async fn run<F, Fut>(&self, key: K, work: F) -> (T, bool)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        loop {
            let role = {
                let mut calls = self.calls.lock();
                match calls.get(&key) {
                    Some(call) => Role::Wait(call.done.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                        calls.insert(key.clone(), Call { generation, done: rx });
                        Role::Lead(generation, tx)
                    }
                }
            };

            match role {
                Role::Lead(generation, tx) => {
                    return (self.lead(key, generation, tx, work).await, false);
                }
                Role::Wait(mut done) => {
                    if let Ok(published) = done.wait_for(Option::is_some).await {
                        if let Some(value) = &*published {
                            return (value.clone(), true);
                        }
                    }
                    // Work panicked without publishing
                    debug!("In-flight computation failed, retrying");
                }
            }
        }
    }

    async fn lead<F, Fut>(
        &self,
        key: K,
        generation: u64,
        tx: watch::Sender<Option<T>>,
        work: F,
    ) -> T
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let guard = LeaderGuard {
            calls: Arc::clone(&self.calls),
            key,
            generation,
            done: tx,
        };

        let handle = tokio::spawn(async move {
            let value = work().await;
            guard.done.send_replace(Some(value.clone()));
            drop(guard);
            value
        });

        match handle.await {
            Ok(value) => value,
            Err(err) => match err.try_into_panic() {
                Ok(payload) => std::panic::resume_unwind(payload),
                // Only runtime shutdown cancels the task, and that drops this caller too
                Err(err) => panic!("in-flight computation cancelled: {err}"),
            },
        }
    }

    // == Forget ==
    /// Detaches the in-flight run for `key`, if any.
    ///
    /// Callers already waiting on it still receive its result; the next
    /// caller for `key` starts a fresh run.
    pub fn forget(&self, key: &K) -> bool {
        self.calls.lock().remove(key).is_some()
    }

    /// Number of keys with a run currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Owned by the spawned work. Unregisters the call when the work finishes
/// or panics, before the completion signal is dropped.
struct LeaderGuard<K: Hash + Eq, T> {
    calls: Registry<K, T>,
    key: K,
    generation: u64,
    done: watch::Sender<Option<T>>,
}

impl<K: Hash + Eq, T> Drop for LeaderGuard<K, T> {
    fn drop(&mut self) {
        let mut calls = self.calls.lock();
        // A forgotten call may already have been replaced by a newer one
        if calls
            .get(&self.key)
            .is_some_and(|call| call.generation == self.generation)
        {
            calls.remove(&self.key);
        }
    }
}
