//! Cache Module
//!
//! Provides a bounded LRU result store with optional TTL expiration and
//! single-flight coalescing of concurrent misses.

mod coalescing;
mod entry;
mod flight;
mod stats;
mod store;


// Re-export public types
pub use coalescing::{CoalescingCache, Lookup};
pub use entry::CacheEntry;
pub use flight::FlightGroup;
pub use stats::CacheStats;
pub use store::BoundedStore;
