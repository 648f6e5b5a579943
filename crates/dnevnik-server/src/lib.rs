//! HTTP proxy server for Dnevnik.
//!
//! Authenticated clients call the proxy with a session token; the proxy
//! forwards requests to the upstream school-information API and returns its
//! JSON documents, or a structured `{message, cause}` error.
//!
//! # Features
//!
//! - Session tokens via `Authorization: Bearer` or cookie
//! - Per-subject response cache for configured routes
//! - Upstream failure translation (400 / 401 / 404 / 503)
//! - Optional rate limiting and CORS
//! - Request logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dnevnik_cache::{CacheConfig, ResponseCache};
//! use dnevnik_server::{Server, ServerConfig, SessionKeys};
//! use dnevnik_upstream::HttpUpstream;
//!
//! let upstream = HttpUpstream::builder()
//!     .base_url("https://diary.example.org/api")
//!     .build()?;
//! let server = Server::new(
//!     ServerConfig::new().with_bind_address("127.0.0.1:8080".parse()?),
//!     Arc::new(upstream),
//!     ResponseCache::new(CacheConfig::default()),
//!     SessionKeys::new(b"secret"),
//! );
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod proxy;
pub mod ratelimit;
pub mod routes;
pub mod state;

pub use auth::{AuthError, Session, SessionClaims, SessionKeys, auth_middleware, extract_token};
pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use proxy::{CachePolicy, Origin, Proxied};
pub use ratelimit::{rate_limit_middleware, request_logging_middleware};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
};
use dnevnik_cache::ResponseCache;
use dnevnik_upstream::SharedUpstream;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The Dnevnik HTTP proxy server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server from its collaborators.
    pub fn new(
        config: ServerConfig,
        upstream: SharedUpstream,
        cache: ResponseCache,
        keys: SessionKeys,
    ) -> Self {
        Self {
            state: AppState::new(config, upstream, cache, keys),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Get the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            // Health routes (no auth required)
            .merge(routes::health_routes())
            .merge(self.api_routes())
            // Request logging (inner layer, runs first)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::request_logging_middleware,
            ))
            // Rate limiting (outer layer, runs before request logging)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        if let Some(cors) = cors_layer(&self.state.config.cors_origins) {
            router = router.layer(cors);
        }

        router.with_state(self.state.clone())
    }

    /// Proxied API routes, all behind the session middleware.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::get;

        Router::new()
            .route("/contingent", get(routes::contingent_handler))
            .route("/journal", get(routes::journal_handler))
            .route("/journal/{subject}", get(routes::journal_subject_handler))
            .route("/reports", get(routes::reports_handler))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::auth_middleware,
            ))
    }

    /// Run the server until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.bind_address())
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();

        info!("Starting server on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}

/// Build the CORS layer for the configured origins.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        layer
            .allow_origin(AllowOrigin::list(parsed))
            .allow_credentials(true),
    )
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
