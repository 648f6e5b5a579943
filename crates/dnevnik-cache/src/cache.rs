//! Response cache with lazy TTL expiry and optional LRU bound.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::clock::{SharedClock, SystemClock};
use crate::config::CacheConfig;
use crate::key::CacheKey;

/// Entry stored in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached payload.
    pub payload: V,

    /// When this entry was inserted, according to the cache's clock.
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(payload: V, inserted_at: Instant) -> Self {
        Self {
            payload,
            inserted_at,
        }
    }

    /// Whether the entry is still inside its validity window at `now`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: u64,
    misses: u64,
    expirations: u64,
    evictions: u64,
}

/// Inner state protected by the store lock.
struct CacheInner<V> {
    lru: LruCache<CacheKey, CacheEntry<V>>,
    counters: Counters,
}

/// Process-wide response cache.
///
/// Lookups and writes each take the store lock once, so the
/// check-then-evict in [`get`](Self::get) is atomic with respect to other
/// lookups of the same key. Handles are cheap to clone and share the
/// underlying store.
///
/// Expired entries linger until their key is looked up again; they never
/// count as hits. When a bound is configured, `put` evicts the least
/// recently used entry independently of expiry.
pub struct ResponseCache<V = Value> {
    inner: Arc<Mutex<CacheInner<V>>>,
    clock: SharedClock,
    config: CacheConfig,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache that reads wall-clock time.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source.
    pub fn with_clock(config: CacheConfig, clock: SharedClock) -> Self {
        let lru = match config.max_entries.and_then(NonZeroUsize::new) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                lru,
                counters: Counters::default(),
            })),
            clock,
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The TTL applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Look up a payload.
    ///
    /// Returns the payload only while the entry is fresh. A stale entry is
    /// removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let fresh = match inner.lru.get(key) {
            Some(entry) if entry.is_fresh(now, self.config.ttl) => Some(entry.payload.clone()),
            Some(_) => None,
            None => {
                inner.counters.misses += 1;
                trace!(key = %key, "Cache miss");
                return None;
            }
        };

        match fresh {
            Some(payload) => {
                inner.counters.hits += 1;
                trace!(key = %key, "Cache hit");
                Some(payload)
            }
            None => {
                inner.lru.pop(key);
                inner.counters.expirations += 1;
                inner.counters.misses += 1;
                debug!(key = %key, "Cache entry expired, evicting");
                None
            }
        }
    }

    /// Store a payload, replacing any existing entry for `key` with a freshly
    /// timestamped one.
    pub fn put(&self, key: CacheKey, payload: V) {
        let now = self.clock.now();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let displaced = inner
            .lru
            .push(key.clone(), CacheEntry::new(payload, now));

        if let Some((evicted, _)) = displaced
            && evicted != key
        {
            inner.counters.evictions += 1;
            debug!(key = %evicted, "Evicting LRU entry to make room");
        }

        trace!(key = %key, cache_size = inner.lru.len(), "Entry inserted into cache");
    }

    /// Remove an entry regardless of freshness.
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.inner.lock().lru.pop(key).map(|e| e.payload)
    }

    /// Number of stored entries, including expired ones not yet looked up.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    /// Check if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().lru.clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.lru.len(),
            capacity: self.config.max_entries,
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            expirations: inner.counters.expirations,
            evictions: inner.counters.evictions,
        }
    }
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of stored entries.
    pub size: usize,

    /// Maximum capacity (`None` = unbounded).
    pub capacity: Option<usize>,

    /// Lookups served from a fresh entry.
    pub hits: u64,

    /// Lookups that found nothing usable (absent or expired).
    pub misses: u64,

    /// Entries removed because they were found stale.
    pub expirations: u64,

    /// Entries removed by the LRU bound.
    pub evictions: u64,
}
