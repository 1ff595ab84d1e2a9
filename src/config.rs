//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Entry TTL in seconds, 0 = entries never expire
    pub ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Number of concurrent lookups the demo binary issues
    pub demo_workers: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL` - Entry TTL in seconds, 0 disables expiry (default: 0)
    /// - `CACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `CACHE_DEMO_WORKERS` - Concurrent demo lookups (default: 50)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            ttl: parse_var("CACHE_TTL").unwrap_or(defaults.ttl),
            cleanup_interval: parse_var("CACHE_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            demo_workers: parse_var("CACHE_DEMO_WORKERS").unwrap_or(defaults.demo_workers),
        }
    }

    /// Rejects values the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidCapacity(self.max_entries));
        }
        if self.cleanup_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Entry TTL as a duration, `None` when expiry is disabled.
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl > 0).then(|| Duration::from_secs(self.ttl))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl: 0,
            cleanup_interval: 1,
            demo_workers: 50,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.ttl, 0);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.demo_workers, 50);
        assert!(config.ttl().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_TTL");
        env::remove_var("CACHE_CLEANUP_INTERVAL");
        env::remove_var("CACHE_DEMO_WORKERS");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.ttl, 0);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.demo_workers, 50);

        env::set_var("CACHE_MAX_ENTRIES", "25");
        env::set_var("CACHE_TTL", "30");
        env::set_var("CACHE_CLEANUP_INTERVAL", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 25);
        assert_eq!(config.ttl(), Some(Duration::from_secs(30)));
        // Unparseable values fall back to the default
        assert_eq!(config.cleanup_interval, 1);

        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_TTL");
        env::remove_var("CACHE_CLEANUP_INTERVAL");
    }

    #[test]
    fn test_config_validate() {
        let config = Config {
            max_entries: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(CacheError::InvalidCapacity(0)));

        let config = Config {
            cleanup_interval: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
