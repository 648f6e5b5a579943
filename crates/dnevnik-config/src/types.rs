//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]                 # listener, rate limiting, CORS
//! [upstream]               # upstream API base URL and error matching
//! [upstream.cities]        # per-city regional base URLs
//! [cache]                  # response cache TTL, capacity, cacheable routes
//! [auth]                   # session token verification
//! [logging]                # console level and JSON log files
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default API rate limit (requests per minute per client).
pub const DEFAULT_API_RPM: u32 = 600;

/// Default upstream request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Default message prefix identifying an unknown subject.
pub const DEFAULT_NOT_FOUND_PREFIX: &str = "Subject not found";

/// Default cache time-to-live in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default cache capacity.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "dnevnik_session";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnevnikConfig {
    /// HTTP server configuration.
    pub server: Option<ServerConfig>,

    /// Upstream API configuration.
    pub upstream: Option<UpstreamConfig>,

    /// Response cache configuration.
    pub cache: Option<CacheConfig>,

    /// Session authentication configuration.
    pub auth: Option<AuthConfig>,

    /// Logging configuration.
    pub logging: Option<LoggingConfig>,
}

impl DnevnikConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole; city routes are merged by name.
    pub fn merge(&mut self, other: DnevnikConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if let Some(upstream) = other.upstream {
            let mut cities = self
                .upstream
                .take()
                .map(|u| u.cities)
                .unwrap_or_default();
            cities.extend(upstream.cities.clone());
            self.upstream = Some(UpstreamConfig { cities, ..upstream });
        }

        if other.cache.is_some() {
            self.cache = other.cache;
        }

        if other.auth.is_some() {
            self.auth = other.auth;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Effective server section.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Effective upstream section.
    pub fn upstream(&self) -> UpstreamConfig {
        self.upstream.clone().unwrap_or_default()
    }

    /// Effective cache section.
    pub fn cache(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }

    /// Effective auth section.
    pub fn auth(&self) -> AuthConfig {
        self.auth.clone().unwrap_or_default()
    }

    /// Effective logging section.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Copy with the session secret masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(auth) = config.auth.as_mut()
            && auth.session_secret.is_some()
        {
            auth.session_secret = Some("<redacted>".to_string());
        }
        config
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        let upstream = self.upstream();
        if upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let cache = self.cache();
        if cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.ttl_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let server = self.server();
        if server.rate_limiting && server.api_rpm == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.api_rpm".to_string(),
                reason: "must be greater than zero when rate limiting is enabled".to_string(),
            });
        }

        if self.auth().cookie_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.cookie_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Enable rate limiting.
    pub rate_limiting: bool,
    /// API rate limit: requests per minute per client.
    pub api_rpm: u32,
    /// Enable request logging.
    pub request_logging: bool,
    /// Allowed CORS origins. Empty disables CORS.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            rate_limiting: false,
            api_rpm: DEFAULT_API_RPM,
            request_logging: true,
            cors_origins: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Upstream Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Upstream API configuration.
///
/// ```toml
/// [upstream]
/// base_url = "https://diary.example.org/api"
/// timeout_secs = 30
///
/// [upstream.cities]
/// moscow = "https://msk.diary.example.org/api"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Default base URL.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Message prefix the upstream uses for an unknown subject.
    pub not_found_prefix: String,
    /// Regional base URLs keyed by city.
    pub cities: BTreeMap<String, String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            not_found_prefix: DEFAULT_NOT_FOUND_PREFIX.to_string(),
            cities: BTreeMap::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Response cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,
    /// Maximum number of entries (0 = unbounded).
    pub max_entries: usize,
    /// Routes whose responses are cached, by resource kind name.
    pub routes: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            routes: vec!["reports".to_string()],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. Prefer the environment variable.
    pub session_secret: Option<String>,
    /// Cookie consulted when no `Authorization` header is sent.
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: None,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for JSON log files. Defaults to `<config dir>/logs`.
    pub directory: Option<PathBuf>,
    /// Write daily-rotated JSON log files.
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            json_file: true,
        }
    }
}
