//! Student profile endpoint.

use axum::{Extension, extract::State};
use dnevnik_upstream::Resource;

use crate::auth::Session;
use crate::error::Result;
use crate::proxy::{self, Proxied};
use crate::state::AppState;

/// GET /contingent
///
/// Returns the flattened profile: `{ ...additionalInfo, firstName, lastName }`.
pub async fn contingent_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Proxied> {
    proxy::serve(&state, &session, Resource::Contingent).await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, harness, json, token};
    use axum::http::StatusCode;
    use dnevnik_upstream::{MockUpstream, Resource, UpstreamError};
    use serde_json::json;

    #[tokio::test]
    async fn test_contingent_returns_profile() {
        let profile = json!({"class": "7B", "firstName": "Anna", "lastName": "Petrova"});
        let h = harness(MockUpstream::new().with_response(&Resource::Contingent, profile.clone()));

        let response = get(&h.router, "/contingent", Some(&token("s1"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await, profile);
    }

    #[tokio::test]
    async fn test_contingent_upstream_failure() {
        let h = harness(
            MockUpstream::new()
                .with_error(&Resource::Contingent, UpstreamError::Unavailable("shape".into())),
        );

        let response = get(&h.router, "/contingent", Some(&token("s1"))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_contingent_requires_session() {
        let h = harness(MockUpstream::new());

        let response = get(&h.router, "/contingent", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(h.upstream.call_count(), 0);
    }
}
