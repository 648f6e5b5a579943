//! Response cache with lazy TTL expiry.
//!
//! This crate provides the process-wide store that fronts cacheable upstream
//! resources:
//! - Entries are valid while `now - inserted_at < ttl`
//! - Expired entries are evicted on the next lookup of their key (no sweeper)
//! - An optional LRU bound caps memory for long-lived processes
//! - Time is read through an injectable [`Clock`]
//!
//! # Example
//!
//! ```rust,ignore
//! use dnevnik_cache::{CacheConfig, CacheKey, ResponseCache};
//!
//! let cache = ResponseCache::new(CacheConfig::default());
//! let key = CacheKey::new("student-42", "reports");
//!
//! cache.put(key.clone(), serde_json::json!({ "grades": [] }));
//! assert!(cache.get(&key).is_some());
//! ```

mod cache;
mod clock;
mod config;
mod key;

pub use cache::{CacheEntry, CacheStats, ResponseCache};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
pub use key::CacheKey;
