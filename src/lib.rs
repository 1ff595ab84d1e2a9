//! Coalesce Cache - An in-process memoizing cache
//!
//! Bounded LRU storage of computation results (values and errors alike)
//! with single-flight coalescing of concurrent misses for the same key.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, CoalescingCache, Lookup};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
