//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Response cache counters.
    pub cache: CacheHealth,
}

/// Response cache snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheHealth {
    pub size: usize,
    pub capacity: Option<usize>,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
}

/// Health check (no auth required).
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.cache.stats();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: CacheHealth {
            size: stats.size,
            capacity: stats.capacity,
            ttl_secs: state.cache.ttl().as_secs(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            evictions: stats.evictions,
        },
    })
}

/// Create health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
