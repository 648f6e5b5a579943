//! Upstream error types.

use thiserror::Error;

/// Upstream error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The caller described a resource that cannot exist (bad quarter,
    /// empty subject). Raised before any network round-trip.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upstream confirmed that the identified resource does not exist.
    /// Carries the resource id (e.g. the subject).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else: transport failure, timeout, unexpected status or shape.
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// The client was built with invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UpstreamError {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound(_))
    }

    /// Check if this is an availability error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, UpstreamError::Unavailable(_))
    }
}

impl From<url::ParseError> for UpstreamError {
    fn from(e: url::ParseError) -> Self {
        UpstreamError::Config(format!("Invalid URL: {}", e))
    }
}

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, UpstreamError>;
