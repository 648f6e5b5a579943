//! Request orchestration between the response cache and the upstream.
//!
//! For a validated resource and an authenticated session:
//! cacheable routes check the cache first and store fresh upstream payloads;
//! other routes always go upstream. Upstream failures are never cached, and a
//! stale entry is evicted by the lookup before the refetch, so it cannot be
//! served if the refetch fails.

use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use dnevnik_cache::CacheKey;
use dnevnik_upstream::Resource;
use serde_json::Value;
use tracing::debug;

use crate::auth::Session;
use crate::error::Result;
use crate::state::AppState;

/// Per-route caching declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always fetched upstream.
    NoStore,
    /// Cached per subject for `max_age`.
    Private { max_age: Duration },
}

impl CachePolicy {
    /// Whether responses go through the cache.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, CachePolicy::Private { .. })
    }

    /// `Cache-Control` value advertised to clients, if any.
    pub fn header_value(&self) -> Option<HeaderValue> {
        match self {
            CachePolicy::NoStore => None,
            CachePolicy::Private { max_age } => {
                HeaderValue::from_str(&format!("private, max-age={}", max_age.as_secs())).ok()
            }
        }
    }
}

/// Where a response payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Upstream,
}

/// A successful proxied response.
#[derive(Debug, Clone)]
pub struct Proxied {
    pub payload: Value,
    pub policy: CachePolicy,
    pub origin: Origin,
}

impl IntoResponse for Proxied {
    fn into_response(self) -> Response {
        let mut response = Json(self.payload).into_response();
        if let Some(value) = self.policy.header_value() {
            response.headers_mut().insert(CACHE_CONTROL, value);
        }
        response
    }
}

/// Serve `resource` for `session`.
pub async fn serve(state: &AppState, session: &Session, resource: Resource) -> Result<Proxied> {
    let policy = state.cache_policy(resource.kind());

    let key = policy
        .is_cacheable()
        .then(|| CacheKey::new(session.subject.as_str(), resource.canonical()));

    if let Some(ref key) = key
        && let Some(payload) = state.cache.get(key)
    {
        debug!(subject = %session.subject, resource = %resource, "Serving from cache");
        return Ok(Proxied {
            payload,
            policy,
            origin: Origin::Cache,
        });
    }

    let payload = state.upstream.fetch(&session.credentials, &resource).await?;

    if let Some(key) = key {
        debug!(subject = %session.subject, resource = %resource, "Caching upstream response");
        state.cache.put(key, payload.clone());
    }

    Ok(Proxied {
        payload,
        policy,
        origin: Origin::Upstream,
    })
}
