//! Configuration for the response cache.

use std::time::Duration;

/// Default time-to-live for cached responses (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default maximum number of cached responses.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied to every entry. There is no per-entry override.
    pub ttl: Duration,

    /// Maximum number of entries before LRU eviction.
    /// `None` leaves the store unbounded (expiry is then the only removal path).
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: Some(DEFAULT_MAX_ENTRIES),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL for cached entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of entries. Zero means unbounded.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = (max > 0).then_some(max);
        self
    }

    /// Remove the entry bound.
    pub fn unbounded(mut self) -> Self {
        self.max_entries = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_entries, Some(DEFAULT_MAX_ENTRIES));
    }

    #[test]
    fn test_zero_max_entries_is_unbounded() {
        let config = CacheConfig::new().with_max_entries(0);
        assert_eq!(config.max_entries, None);

        let config = CacheConfig::new().with_max_entries(5);
        assert_eq!(config.max_entries, Some(5));
    }
}
