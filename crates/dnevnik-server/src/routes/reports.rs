//! Report card endpoint.

use axum::{Extension, extract::State};
use dnevnik_upstream::Resource;

use crate::auth::Session;
use crate::error::Result;
use crate::proxy::{self, Proxied};
use crate::state::AppState;

/// GET /reports
pub async fn reports_handler(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Proxied> {
    proxy::serve(&state, &session, Resource::Reports).await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, harness, json, token};
    use axum::http::{StatusCode, header::CACHE_CONTROL};
    use dnevnik_upstream::{MockUpstream, Resource, UpstreamError};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reports_cached_within_ttl() {
        let h = harness(MockUpstream::new().with_response(&Resource::Reports, json!({"avg": 4.5})));
        let token = token("s1");

        let first = get(&h.router, "/reports", Some(&token)).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            first.headers().get(CACHE_CONTROL).unwrap(),
            "private, max-age=3600"
        );
        let first_body = json(first).await;

        let second = get(&h.router, "/reports", Some(&token)).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(
            second.headers().get(CACHE_CONTROL).unwrap(),
            "private, max-age=3600"
        );
        assert_eq!(json(second).await, first_body);

        assert_eq!(h.upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reports_refetched_after_ttl() {
        let h = harness(MockUpstream::new().with_response(&Resource::Reports, json!({})));
        let token = token("s1");

        get(&h.router, "/reports", Some(&token)).await;
        h.clock.advance(Duration::from_secs(3599));
        get(&h.router, "/reports", Some(&token)).await;
        assert_eq!(h.upstream.call_count(), 1);

        h.clock.advance(Duration::from_secs(2));
        get(&h.router, "/reports", Some(&token)).await;
        assert_eq!(h.upstream.call_count(), 2);
    }

    #[tokio::test]
    async fn test_reports_failure_after_expiry_is_503() {
        let h = harness(
            MockUpstream::new()
                .with_response(&Resource::Reports, json!({"v": 1}))
                .with_error(&Resource::Reports, UpstreamError::Unavailable("down".into())),
        );
        let token = token("s1");

        assert_eq!(get(&h.router, "/reports", Some(&token)).await.status(), StatusCode::OK);
        h.clock.advance(Duration::from_secs(3601));

        let response = get(&h.router, "/reports", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(h.state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_reports_isolated_per_subject() {
        let h = harness(MockUpstream::new().with_response(&Resource::Reports, json!({})));

        get(&h.router, "/reports", Some(&token("s1"))).await;
        get(&h.router, "/reports", Some(&token("s2"))).await;
        get(&h.router, "/reports", Some(&token("s1"))).await;

        assert_eq!(h.upstream.call_count(), 2);
    }
}
