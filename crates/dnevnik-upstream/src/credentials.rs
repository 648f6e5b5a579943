//! Credentials forwarded to the upstream.

use std::fmt;

/// The upstream-facing half of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Opaque credential sent as a bearer token.
    pub access_token: String,
    /// Regional routing hint; selects the upstream base URL.
    pub city: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(access_token: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            city: city.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("city", &self.city)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::new("secret-token", "moscow");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("moscow"));
    }
}
