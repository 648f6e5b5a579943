//! Token command - mints session tokens for exercising the API.

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use dnevnik_config::{SESSION_SECRET_ENV, resolve_session_secret};
use dnevnik_server::SessionKeys;
use dnevnik_upstream::Credentials;

use super::Context;

/// Arguments for the token command.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Subject the session belongs to
    #[arg(long)]
    pub subject: String,

    /// Upstream access token carried by the session
    #[arg(long)]
    pub access_token: String,

    /// City selecting the regional upstream
    #[arg(long, default_value = "")]
    pub city: String,

    /// Token lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl_secs: u64,
}

/// Run the token command.
pub async fn run(args: TokenArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?.config;
    let secret = resolve_session_secret(config.auth().session_secret.as_deref())
        .with_context(|| {
            format!(
                "no session secret configured: set {} or auth.session_secret",
                SESSION_SECRET_ENV
            )
        })?;

    let token = mint(secret.value.as_bytes(), &args)?;
    println!("{}", token);
    Ok(())
}

fn mint(secret: &[u8], args: &TokenArgs) -> Result<String> {
    anyhow::ensure!(!args.subject.trim().is_empty(), "subject must not be empty");

    let credentials = Credentials::new(args.access_token.clone(), args.city.clone());
    let token = SessionKeys::new(secret).issue(
        &args.subject,
        &credentials,
        Duration::from_secs(args.ttl_secs),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(subject: &str) -> TokenArgs {
        TokenArgs {
            subject: subject.to_string(),
            access_token: "upstream-token".to_string(),
            city: "moscow".to_string(),
            ttl_secs: 600,
        }
    }

    #[test]
    fn test_minted_token_verifies() {
        let token = mint(b"secret", &args("S1")).unwrap();

        let session = SessionKeys::new(b"secret").verify(&token).unwrap();
        assert_eq!(session.subject, "S1");
        assert_eq!(session.credentials.access_token, "upstream-token");
        assert_eq!(session.credentials.city, "moscow");
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let token = mint(b"secret", &args("S1")).unwrap();
        assert!(SessionKeys::new(b"other").verify(&token).is_err());
    }

    #[test]
    fn test_empty_subject_rejected() {
        assert!(mint(b"secret", &args("  ")).is_err());
    }
}
