//! Full stack against an HTTP upstream served by wiremock.

mod common;

use std::sync::Arc;

use anyhow::Result;
use dnevnik_server::ServerConfig;
use dnevnik_upstream::HttpUpstream;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start(upstream: &MockServer) -> Result<common::TestServer> {
    let client = HttpUpstream::builder().base_url(upstream.uri()).build()?;
    common::TestServer::start_with(Arc::new(client), ServerConfig::new()).await
}

#[tokio::test]
async fn test_subject_not_found_message_maps_to_404() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/journal/subj-x"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"message": "Subject not found: subj-x"})),
        )
        .mount(&upstream)
        .await;

    let server = start(&upstream).await?;
    let resp = server.get_as("S1", "/journal/subj-x?quarter=2").send().await?;

    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await?;
    assert!(body["cause"].as_str().unwrap_or_default().contains("subj-x"));

    server.stop().await
}

#[tokio::test]
async fn test_upstream_error_maps_to_503() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/journal"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .mount(&upstream)
        .await;

    let server = start(&upstream).await?;
    let resp = server.get_as("S1", "/journal").send().await?;

    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = resp.json().await?;
    assert!(!body["cause"].as_str().unwrap_or_default().contains("db down"));

    server.stop().await
}

#[tokio::test]
async fn test_session_credentials_forwarded() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/journal/subj-math"))
        .and(query_param("quarter", "4"))
        .and(header("authorization", "Bearer S1-upstream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"marks": [5, 5]})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = start(&upstream).await?;
    let resp = server
        .get_as("S1", "/journal/subj-math?quarter=4")
        .send()
        .await?;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({"marks": [5, 5]}));

    server.stop().await
}

#[tokio::test]
async fn test_contingent_flattened_end_to_end() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contingent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firstName": "Anna",
            "lastName": "Petrova",
            "additionalInfo": {"class": "7B", "school": "Lyceum 2"}
        })))
        .mount(&upstream)
        .await;

    let server = start(&upstream).await?;
    let resp = server.get_as("S1", "/contingent").send().await?;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await?;
    assert_eq!(
        body,
        json!({"class": "7B", "school": "Lyceum 2", "firstName": "Anna", "lastName": "Petrova"})
    );

    server.stop().await
}

#[tokio::test]
async fn test_reports_cached_across_http_calls() -> Result<()> {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"avg": 4.8})))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = start(&upstream).await?;
    for _ in 0..3 {
        let resp = server.get_as("S1", "/reports").send().await?;
        assert_eq!(resp.status().as_u16(), 200);
    }

    server.stop().await
}
