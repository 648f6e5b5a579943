//! Application state shared across handlers.

use std::sync::Arc;

use dnevnik_cache::ResponseCache;
use dnevnik_upstream::{ResourceKind, SharedUpstream};

use crate::auth::SessionKeys;
use crate::config::ServerConfig;
use crate::proxy::CachePolicy;
use crate::ratelimit::{SharedRateLimiter, create_rate_limiter};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Upstream API.
    pub upstream: SharedUpstream,

    /// Process-wide response cache.
    pub cache: ResponseCache,

    /// Session token keys.
    pub keys: Arc<SessionKeys>,

    /// Global rate limiter (None when rate limiting is disabled).
    pub limiter: Option<SharedRateLimiter>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: ServerConfig,
        upstream: SharedUpstream,
        cache: ResponseCache,
        keys: SessionKeys,
    ) -> Self {
        let limiter = config
            .rate_limiting
            .then(|| create_rate_limiter(config.api_rpm));

        Self {
            config: Arc::new(config),
            upstream,
            cache,
            keys: Arc::new(keys),
            limiter,
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Caching policy for responses of `kind`.
    pub fn cache_policy(&self, kind: ResourceKind) -> CachePolicy {
        if self.config.is_cached(kind) {
            CachePolicy::Private {
                max_age: self.cache.ttl(),
            }
        } else {
            CachePolicy::NoStore
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("keys", &self.keys)
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}
