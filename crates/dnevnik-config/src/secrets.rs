//! Session secret resolution.
//!
//! Resolution order:
//! 1. Environment variable (`DNEVNIK_SESSION_SECRET`)
//! 2. Config file (with warning at load time)

/// Environment variable holding the session signing secret.
pub const SESSION_SECRET_ENV: &str = "DNEVNIK_SESSION_SECRET";

/// Result of secret resolution with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the session secret from the environment, then the config value.
pub fn resolve_session_secret(config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve_from(std::env::var(SESSION_SECRET_ENV).ok(), config_value)
}

fn resolve_from(env_value: Option<String>, config_value: Option<&str>) -> Option<ResolvedSecret> {
    if let Some(value) = env_value
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(SESSION_SECRET_ENV.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}
