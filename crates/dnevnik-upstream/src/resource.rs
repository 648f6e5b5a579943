//! Validated resource descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpstreamError};

/// Message for a missing `quarter` query parameter.
const QUARTER_REQUIRED: &str = "Quarter index (quarter search param) is required";

/// Message for a `quarter` that is not an integer in 1..=4.
const QUARTER_OUT_OF_RANGE: &str = "Quarter index (quarter search param) must be between 1 and 4";

/// A school quarter, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quarter(u8);

impl Quarter {
    /// Create a quarter, rejecting anything outside 1..=4.
    pub fn new(index: u8) -> Result<Self> {
        if (1..=4).contains(&index) {
            Ok(Self(index))
        } else {
            Err(UpstreamError::BadRequest(QUARTER_OUT_OF_RANGE.to_string()))
        }
    }

    /// Parse the raw `quarter` query parameter.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| UpstreamError::BadRequest(QUARTER_REQUIRED.to_string()))?;

        let index: u8 = raw
            .parse()
            .map_err(|_| UpstreamError::BadRequest(QUARTER_OUT_OF_RANGE.to_string()))?;

        Self::new(index)
    }

    /// The quarter index.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of document a route serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Journal,
    JournalSubject,
    Reports,
    Contingent,
}

impl ResourceKind {
    /// All kinds, in route order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Contingent,
        ResourceKind::Journal,
        ResourceKind::JournalSubject,
        ResourceKind::Reports,
    ];

    /// The configuration name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Journal => "journal",
            ResourceKind::JournalSubject => "journal_subject",
            ResourceKind::Reports => "reports",
            ResourceKind::Contingent => "contingent",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown resource kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind '{0}' (expected one of: contingent, journal, journal_subject, reports)")]
pub struct ParseResourceKindError(pub String);

impl FromStr for ResourceKind {
    type Err = ParseResourceKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseResourceKindError(s.to_string()))
    }
}

/// A resource the upstream can serve, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The full journal.
    Journal,
    /// One subject's journal for a quarter.
    JournalSubject { subject: String, quarter: Quarter },
    /// The report card.
    Reports,
    /// Student profile.
    Contingent,
}

impl Resource {
    /// Build a journal-subject descriptor from raw request parts.
    ///
    /// Validation happens here so no upstream call is made for bad input.
    pub fn journal_subject(subject: impl Into<String>, quarter: Option<&str>) -> Result<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(UpstreamError::BadRequest(
                "Subject id must not be empty".to_string(),
            ));
        }
        let quarter = Quarter::parse(quarter)?;
        Ok(Resource::JournalSubject { subject, quarter })
    }

    /// The kind of this resource.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Journal => ResourceKind::Journal,
            Resource::JournalSubject { .. } => ResourceKind::JournalSubject,
            Resource::Reports => ResourceKind::Reports,
            Resource::Contingent => ResourceKind::Contingent,
        }
    }

    /// Id of the specific resource, when it has one.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Resource::JournalSubject { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Upstream path segments, relative to the base URL.
    pub fn path_segments(&self) -> Vec<&str> {
        match self {
            Resource::Journal => vec!["journal"],
            Resource::JournalSubject { subject, .. } => vec!["journal", subject.as_str()],
            Resource::Reports => vec!["reports"],
            Resource::Contingent => vec!["contingent"],
        }
    }

    /// Upstream query parameters.
    pub fn query(&self) -> Option<(&'static str, String)> {
        match self {
            Resource::JournalSubject { quarter, .. } => Some(("quarter", quarter.to_string())),
            _ => None,
        }
    }

    /// Stable identifier covering every parameter, used for cache keys.
    pub fn canonical(&self) -> String {
        match self {
            Resource::JournalSubject { subject, quarter } => {
                format!("journal/{}/q{}", subject, quarter)
            }
            other => other.kind().as_str().to_string(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
