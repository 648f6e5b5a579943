//! End-to-end proxy behaviour over real HTTP.

mod common;

use std::time::Duration;

use anyhow::Result;
use dnevnik_server::ServerConfig;
use dnevnik_upstream::{MockUpstream, Resource, UpstreamError};
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_without_session() -> Result<()> {
    let server = common::TestServer::start(&MockUpstream::new()).await?;

    let resp = server.get_anonymous("/health").send().await?;
    assert!(resp.status().is_success());

    let body: Value = resp.json().await?;
    assert_eq!(body["status"], "ok");
    assert!(body.get("version").is_some());
    assert!(body.get("cache").is_some());

    server.stop().await
}

#[tokio::test]
async fn test_reports_cache_lifecycle() -> Result<()> {
    let upstream = MockUpstream::new()
        .with_response(&Resource::Reports, json!({"term": 1}))
        .with_response(&Resource::Reports, json!({"term": 2}));
    let server = common::TestServer::start(&upstream).await?;

    // First request goes upstream
    let resp = server.get_as("S1", "/reports").send().await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("private, max-age=3600")
    );
    let first: Value = resp.json().await?;
    assert_eq!(first, json!({"term": 1}));
    assert_eq!(upstream.call_count(), 1);

    // Second request is served from cache
    let resp = server.get_as("S1", "/reports").send().await?;
    assert_eq!(resp.status().as_u16(), 200);
    let second: Value = resp.json().await?;
    assert_eq!(second, first);
    assert_eq!(upstream.call_count(), 1);

    // After the TTL the upstream is called again
    server.clock.advance(Duration::from_secs(3601));
    let resp = server.get_as("S1", "/reports").send().await?;
    let third: Value = resp.json().await?;
    assert_eq!(third, json!({"term": 2}));
    assert_eq!(upstream.call_count(), 2);

    server.stop().await
}

#[tokio::test]
async fn test_stale_entry_not_served_on_refetch_failure() -> Result<()> {
    let upstream = MockUpstream::new()
        .with_response(&Resource::Reports, json!({"term": 1}))
        .with_error(
            &Resource::Reports,
            UpstreamError::Unavailable("connection refused".into()),
        );
    let server = common::TestServer::start(&upstream).await?;

    assert_eq!(server.get_as("S1", "/reports").send().await?.status(), 200);
    server.clock.advance(Duration::from_secs(3601));

    let resp = server.get_as("S1", "/reports").send().await?;
    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Service unavailable");
    assert!(!body["cause"].as_str().unwrap_or_default().contains("refused"));

    server.stop().await
}

#[tokio::test]
async fn test_subjects_never_share_cache() -> Result<()> {
    let upstream = MockUpstream::new().with_response(&Resource::Reports, json!({}));
    let server = common::TestServer::start(&upstream).await?;

    server.get_as("S1", "/reports").send().await?;
    server.get_as("S2", "/reports").send().await?;

    let calls = upstream.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].credentials.access_token, "S1-upstream");
    assert_eq!(calls[1].credentials.access_token, "S2-upstream");

    server.stop().await
}

#[tokio::test]
async fn test_unauthenticated_requests_never_reach_upstream() -> Result<()> {
    let upstream = MockUpstream::new();
    let server = common::TestServer::start(&upstream).await?;

    for path in [
        "/contingent",
        "/journal",
        "/journal/subj-math?quarter=1",
        "/reports",
    ] {
        let resp = server.get_anonymous(path).send().await?;
        assert_eq!(resp.status().as_u16(), 401, "{path}");
        let body: Value = resp.json().await?;
        assert_eq!(body["message"], "Unauthorized");

        let resp = server
            .get_anonymous(path)
            .bearer_auth("not.a.token")
            .send()
            .await?;
        assert_eq!(resp.status().as_u16(), 401, "{path}");

        let resp = server
            .get_anonymous(path)
            .header("Authorization", "Token abc")
            .send()
            .await?;
        assert_eq!(resp.status().as_u16(), 401, "{path}");
    }

    assert_eq!(upstream.call_count(), 0);
    server.stop().await
}

#[tokio::test]
async fn test_quarter_validation_errors() -> Result<()> {
    let upstream = MockUpstream::new();
    let server = common::TestServer::start(&upstream).await?;

    let resp = server
        .get_as("S1", "/journal/subj-math?quarter=5")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(
        body,
        json!({
            "message": "Bad request",
            "cause": "Quarter index (quarter search param) must be between 1 and 4"
        })
    );

    let resp = server.get_as("S1", "/journal/subj-math").send().await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(
        body["cause"],
        "Quarter index (quarter search param) is required"
    );

    assert_eq!(upstream.call_count(), 0);
    server.stop().await
}

#[tokio::test]
async fn test_unknown_subject_is_404() -> Result<()> {
    let resource = Resource::journal_subject("subj-x", Some("3"))?;
    let upstream =
        MockUpstream::new().with_error(&resource, UpstreamError::NotFound("subj-x".into()));
    let server = common::TestServer::start(&upstream).await?;

    let resp = server
        .get_as("S1", "/journal/subj-x?quarter=3")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Not found");
    assert!(body["cause"].as_str().unwrap_or_default().contains("subj-x"));

    server.stop().await
}

#[tokio::test]
async fn test_configured_routes_are_cached() -> Result<()> {
    let upstream = MockUpstream::new()
        .with_response(&Resource::Contingent, json!({"firstName": "A", "lastName": "B"}))
        .with_response(&Resource::Reports, json!({}));
    let config = ServerConfig::new().with_cached_routes([dnevnik_upstream::ResourceKind::Contingent]);
    let server = common::TestServer::start_with(std::sync::Arc::new(upstream.clone()), config).await?;

    server.get_as("S1", "/contingent").send().await?;
    server.get_as("S1", "/contingent").send().await?;
    assert_eq!(upstream.calls_for(&Resource::Contingent), 1);

    let resp = server.get_as("S1", "/reports").send().await?;
    assert!(resp.headers().get("cache-control").is_none());
    server.get_as("S1", "/reports").send().await?;
    assert_eq!(upstream.calls_for(&Resource::Reports), 2);

    server.stop().await
}

#[tokio::test]
async fn test_rate_limited_requests_get_429() -> Result<()> {
    let upstream = MockUpstream::new().with_response(&Resource::Journal, json!({}));
    let config = ServerConfig::new().with_rate_limiting(true).with_api_rpm(3);
    let server = common::TestServer::start_with(std::sync::Arc::new(upstream), config).await?;

    // The readiness probe used one request of the quota.
    let mut statuses = Vec::new();
    for _ in 0..4 {
        statuses.push(server.get_as("S1", "/journal").send().await?.status().as_u16());
    }

    assert!(statuses.contains(&429));
    server.stop().await
}
