//! Translation of raw upstream failures into [`UpstreamError`].
//!
//! The upstream does not expose a stable error code for "no such subject";
//! it returns a message that begins with a known prefix. That wording is the
//! only signal we have, so the rule lives here, behind [`ErrorClassifier`],
//! where it can be tested and replaced on its own. When the upstream sends a
//! structured `code` of [`NOT_FOUND_CODE`], that takes precedence over the
//! message text.

use serde::Deserialize;
use tracing::debug;

use crate::error::UpstreamError;
use crate::resource::Resource;

/// Message prefix the upstream uses for an unknown subject.
pub const DEFAULT_NOT_FOUND_PREFIX: &str = "Subject not found";

/// Structured error code meaning the resource does not exist.
pub const NOT_FOUND_CODE: &str = "not_found";

/// Error body as returned by the upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// A failure exactly as observed on the wire, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawUpstreamError {
    /// The request never produced a response (connect error, timeout).
    Transport(String),
    /// The upstream answered with a non-success status.
    Status {
        status: u16,
        body: Option<UpstreamErrorBody>,
    },
    /// A success response whose body could not be used.
    Decode(String),
}

impl RawUpstreamError {
    /// Short description for logs. Never sent to clients.
    pub fn describe(&self) -> String {
        match self {
            RawUpstreamError::Transport(e) => format!("transport error: {}", e),
            RawUpstreamError::Status { status, body } => {
                match body.as_ref().and_then(|b| b.message.as_deref()) {
                    Some(message) => format!("HTTP {}: {}", status, message),
                    None => format!("HTTP {}", status),
                }
            }
            RawUpstreamError::Decode(e) => format!("unexpected response: {}", e),
        }
    }
}

/// Decides what a raw upstream failure means for the caller.
pub trait ErrorClassifier: Send + Sync + std::fmt::Debug {
    /// Classify a failure that occurred while fetching `resource`.
    fn classify(&self, raw: &RawUpstreamError, resource: &Resource) -> UpstreamError;
}

/// Classifier matching a message prefix (or structured code) as "not found".
#[derive(Debug, Clone)]
pub struct PrefixClassifier {
    not_found_prefix: String,
}

impl PrefixClassifier {
    /// Create a classifier with a custom not-found prefix.
    pub fn new(not_found_prefix: impl Into<String>) -> Self {
        Self {
            not_found_prefix: not_found_prefix.into(),
        }
    }

    /// The prefix this classifier matches.
    pub fn not_found_prefix(&self) -> &str {
        &self.not_found_prefix
    }
}

impl Default for PrefixClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOT_FOUND_PREFIX)
    }
}

impl ErrorClassifier for PrefixClassifier {
    fn classify(&self, raw: &RawUpstreamError, resource: &Resource) -> UpstreamError {
        classify_upstream_error(raw, resource, &self.not_found_prefix)
    }
}

/// Classify a raw upstream failure.
///
/// Contract:
/// - Only resources that carry an id (see [`Resource::resource_id`]) can be
///   `NotFound`; the id is what the caller gets back.
/// - `NotFound` requires an error body whose `code` is [`NOT_FOUND_CODE`] or
///   whose `message` starts with `not_found_prefix`. The HTTP status alone is
///   not trusted.
/// - Everything else is `Unavailable`.
pub fn classify_upstream_error(
    raw: &RawUpstreamError,
    resource: &Resource,
    not_found_prefix: &str,
) -> UpstreamError {
    if let (Some(id), RawUpstreamError::Status { body: Some(body), .. }) =
        (resource.resource_id(), raw)
    {
        let coded = body.code.as_deref() == Some(NOT_FOUND_CODE);
        let worded = !not_found_prefix.is_empty()
            && body
                .message
                .as_deref()
                .is_some_and(|m| m.starts_with(not_found_prefix));

        if coded || worded {
            debug!(resource = %resource, coded, worded, "Upstream failure classified as not found");
            return UpstreamError::NotFound(id.to_string());
        }
    }

    UpstreamError::Unavailable(raw.describe())
}
