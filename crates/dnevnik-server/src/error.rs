//! Error types for the server.

use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dnevnik_upstream::UpstreamError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server error type.
///
/// Every variant is terminal for the request; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Session credential absent, malformed or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request parameters failed validation.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upstream confirmed the resource does not exist. Carries its id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upstream failed in any other way. Carries a detail for logs only.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The body sent to the client.
    ///
    /// Upstream and internal details stay in the logs.
    pub fn to_body(&self) -> ErrorResponse {
        let (message, cause) = match self {
            ServerError::Unauthorized(cause) => ("Unauthorized", cause.clone()),
            ServerError::BadRequest(reason) => ("Bad request", reason.clone()),
            ServerError::NotFound(id) => ("Not found", format!("Subject {} not found", id)),
            ServerError::UpstreamUnavailable(_) => (
                "Service unavailable",
                "The school information service is not responding".to_string(),
            ),
            ServerError::RateLimited => (
                "Too many requests",
                "Rate limit exceeded, retry later".to_string(),
            ),
            ServerError::Internal(_) => (
                "Internal server error",
                "The request could not be completed".to_string(),
            ),
        };

        ErrorResponse {
            message: message.to_string(),
            cause,
        }
    }
}

impl From<UpstreamError> for ServerError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::BadRequest(reason) => ServerError::BadRequest(reason),
            UpstreamError::NotFound(id) => ServerError::NotFound(id),
            UpstreamError::Unavailable(detail) => ServerError::UpstreamUnavailable(detail),
            UpstreamError::Config(detail) => ServerError::Internal(detail),
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short, stable summary for programmatic handling.
    pub message: String,
    /// Human-readable explanation.
    pub cause: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_body();
        let error = self.to_string();

        match &self {
            ServerError::UpstreamUnavailable(_) | ServerError::Internal(_) => {
                tracing::error!(status = %status, error = %error, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, error = %error, "Client error");
            }
        }

        (status, Json(body)).into_response()
    }
}
