//! Cache key derivation.

use std::fmt;

/// Identifies one cached response: who asked, and for what.
///
/// Keys compare structurally, so `("a/b", "c")` and `("a", "b/c")` are
/// distinct even though their display forms match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    subject: String,
    resource: String,
}

impl CacheKey {
    /// Build a key from the authenticated subject id and the canonical
    /// resource segment (e.g. `reports`, `journal/math/q2`).
    pub fn new(subject: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            resource: resource.into(),
        }
    }

    /// The authenticated subject this entry belongs to.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The resource segment.
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_subject_and_resource_collide() {
        assert_eq!(CacheKey::new("s1", "reports"), CacheKey::new("s1", "reports"));
    }

    #[test]
    fn test_different_subjects_never_collide() {
        assert_ne!(CacheKey::new("s1", "reports"), CacheKey::new("s2", "reports"));
        assert_ne!(CacheKey::new("a:b", "c"), CacheKey::new("a", "b:c"));
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheKey::new("s1", "reports").to_string(), "s1:reports");
    }
}
