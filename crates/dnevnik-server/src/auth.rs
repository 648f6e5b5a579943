//! Session authentication middleware.
//!
//! A session is carried by an HS256-signed JWT, sent either as
//! `Authorization: Bearer <token>` or, when no header is present, in the
//! session cookie. The token embeds the upstream access token and city, so
//! the proxy holds no session state of its own.
//!
//! Every failure is a 401; nothing downstream runs for an unauthenticated
//! request.

use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use dnevnik_upstream::Credentials;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// JWT claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated subject id (e.g. the student id).
    pub sub: String,
    /// Opaque credential forwarded to the upstream.
    pub access_token: String,
    /// Regional routing hint.
    pub city: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Authenticated request context, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Subject id; scopes cache entries.
    pub subject: String,
    /// What the upstream needs to serve this subject.
    pub credentials: Credentials,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            credentials: Credentials::new(claims.access_token, claims.city),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Error
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Neither the header nor the cookie carried a token.
    #[error("Missing session token")]
    MissingToken,
    /// Header present but not a UTF-8 `Bearer` credential.
    #[error("Invalid authorization format")]
    InvalidFormat,
    /// Signature, encoding or claims rejected.
    #[error("Invalid session token")]
    InvalidToken,
    /// Token past its `exp`.
    #[error("Session token has expired")]
    Expired,
    /// A token could not be issued.
    #[error("Failed to issue session token: {0}")]
    Signing(String),
}

impl From<AuthError> for ServerError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Signing(detail) => ServerError::Internal(detail),
            other => ServerError::Unauthorized(other.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Issues and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    /// Create keys from the signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `subject` valid for `ttl`.
    pub fn issue(
        &self,
        subject: &str,
        credentials: &Credentials,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: subject.to_string(),
            access_token: credentials.access_token.clone(),
            city: credentials.city.clone(),
            exp: jsonwebtoken::get_current_timestamp() + ttl.as_secs(),
        };
        self.encode(&claims)
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token and recover the session.
    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        if data.claims.sub.trim().is_empty() {
            tracing::debug!("Session token rejected: empty subject");
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims.into())
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication middleware function.
///
/// Verifies the session token and injects the [`Session`] into request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let token = extract_token(request.headers(), &state.config.cookie_name)?;
    let session = state.keys.verify(&token)?;

    tracing::trace!(subject = %session.subject, "Session authenticated");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Find the session token in the request headers.
///
/// The `Authorization` header wins; the cookie is consulted only when the
/// header is absent.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AuthError> {
    if let Some(auth_header) = headers.get(AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidFormat)?;
        return auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::InvalidFormat);
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
