//! Client for the upstream school-information API.
//!
//! The proxy never talks HTTP to the upstream directly; it goes through the
//! [`Upstream`] trait so routes can be exercised against [`MockUpstream`]
//! (behind the `testing` feature) and the real [`HttpUpstream`] alike.
//!
//! # Example
//!
//! ```no_run
//! use dnevnik_upstream::{Credentials, HttpUpstream, Resource, Upstream};
//!
//! # async fn example() -> dnevnik_upstream::Result<()> {
//! let upstream = HttpUpstream::builder()
//!     .base_url("https://diary.example.org/api")
//!     .build()?;
//!
//! let credentials = Credentials::new("opaque-access-token", "moscow");
//! let reports = upstream.fetch(&credentials, &Resource::Reports).await?;
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
mod credentials;
mod error;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod normalize;
mod resource;

pub use classify::{
    DEFAULT_NOT_FOUND_PREFIX, ErrorClassifier, NOT_FOUND_CODE, PrefixClassifier,
    RawUpstreamError, UpstreamErrorBody, classify_upstream_error,
};
pub use client::{DEFAULT_TIMEOUT, HttpUpstream, UpstreamBuilder};
pub use credentials::Credentials;
pub use error::{Result, UpstreamError};
#[cfg(any(test, feature = "testing"))]
pub use mock::{MockUpstream, RecordedCall};
pub use normalize::{flatten_contingent, normalize};
pub use resource::{ParseResourceKindError, Quarter, Resource, ResourceKind};

use async_trait::async_trait;
use std::sync::Arc;

/// Source of journal, report and profile documents.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch one resource on behalf of the holder of `credentials`.
    ///
    /// Implementations never retry. Any failure that is not a confirmed
    /// absence of the resource is [`UpstreamError::Unavailable`].
    async fn fetch(
        &self,
        credentials: &Credentials,
        resource: &Resource,
    ) -> Result<serde_json::Value>;
}

/// An upstream that can be shared across handlers.
pub type SharedUpstream = Arc<dyn Upstream>;
