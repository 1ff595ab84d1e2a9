//! Cache Entry Module
//!
//! Defines the structure for individual cache entries: a memoized
//! computation result plus optional TTL metadata.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A memoized computation result with metadata.
///
/// Errors are stored exactly like values.
#[derive(Debug, Clone)]
pub struct CacheEntry<V, E> {
    /// The stored result
    pub result: Result<V, E>,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<V, E> CacheEntry<V, E> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `result` - The computation result to store
    /// * `ttl` - Optional time to live
    pub fn new(result: Result<V, E>, ttl: Option<Duration>) -> Self {
        Self {
            result,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration instant.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }
}
