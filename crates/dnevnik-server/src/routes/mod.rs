//! API routes.

pub mod contingent;
pub mod health;
pub mod journal;
pub mod reports;

pub use contingent::contingent_handler;
pub use health::{CacheHealth, HealthResponse, health_routes};
pub use journal::{JournalQuery, journal_handler, journal_subject_handler};
pub use reports::reports_handler;

#[cfg(test)]
pub(crate) mod test_support {
    //! Router and session helpers shared by route tests.

    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response},
    };
    use dnevnik_cache::{CacheConfig, ManualClock, ResponseCache};
    use dnevnik_upstream::{Credentials, MockUpstream};
    use tower::ServiceExt;

    use crate::{AppState, Server, ServerConfig, SessionKeys};

    pub const SECRET: &[u8] = b"route-test-secret";

    pub struct Harness {
        pub router: Router,
        pub upstream: MockUpstream,
        pub clock: ManualClock,
        pub state: AppState,
    }

    pub fn harness(upstream: MockUpstream) -> Harness {
        let clock = ManualClock::new();
        let cache = ResponseCache::with_clock(CacheConfig::default(), Arc::new(clock.clone()));
        let state = AppState::new(
            ServerConfig::default().with_request_logging(false),
            Arc::new(upstream.clone()),
            cache,
            SessionKeys::new(SECRET),
        );
        let router = Server::from_state(state.clone()).router();

        Harness {
            router,
            upstream,
            clock,
            state,
        }
    }

    pub fn token(subject: &str) -> String {
        SessionKeys::new(SECRET)
            .issue(
                subject,
                &Credentials::new(format!("{subject}-upstream"), "moscow"),
                Duration::from_secs(600),
            )
            .unwrap()
    }

    pub async fn get(router: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn json(response: Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
