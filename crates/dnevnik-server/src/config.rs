//! Server configuration.

use std::collections::HashSet;
use std::net::SocketAddr;

use dnevnik_upstream::ResourceKind;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 8080);

/// Default API rate limit (requests per minute).
pub const DEFAULT_API_RPM: u32 = 600;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "dnevnik_session";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable rate limiting.
    pub rate_limiting: bool,

    /// Rate limit: requests per minute for API endpoints.
    pub api_rpm: u32,

    /// Enable request logging.
    pub request_logging: bool,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,

    /// Cookie consulted for the session token when no header is sent.
    pub cookie_name: String,

    /// Routes whose responses go through the response cache.
    pub cached_routes: HashSet<ResourceKind>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS,
            rate_limiting: false,
            api_rpm: DEFAULT_API_RPM,
            request_logging: true,
            cors_origins: Vec::new(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cached_routes: HashSet::from([ResourceKind::Reports]),
        }
    }
}

impl ServerConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable rate limiting.
    pub fn with_rate_limiting(mut self, enabled: bool) -> Self {
        self.rate_limiting = enabled;
        self
    }

    /// Set the API rate limit (requests per minute).
    pub fn with_api_rpm(mut self, rpm: u32) -> Self {
        self.api_rpm = rpm;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Replace the set of cached routes.
    pub fn with_cached_routes(mut self, routes: impl IntoIterator<Item = ResourceKind>) -> Self {
        self.cached_routes = routes.into_iter().collect();
        self
    }

    /// Whether responses for `kind` are cached.
    pub fn is_cached(&self, kind: ResourceKind) -> bool {
        self.cached_routes.contains(&kind)
    }
}
