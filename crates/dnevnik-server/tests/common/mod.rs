//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use dnevnik_cache::{CacheConfig, ManualClock, ResponseCache};
use dnevnik_server::{Server, ServerConfig, SessionKeys};
use dnevnik_upstream::{Credentials, MockUpstream, SharedUpstream};

/// Secret shared by the test server and token helpers.
pub const SECRET: &[u8] = b"integration-test-secret";

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server.
    pub client: Client,
    /// Clock driving the response cache.
    pub clock: ManualClock,
    keys: SessionKeys,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a test server backed by a scripted upstream.
    pub async fn start(upstream: &MockUpstream) -> Result<Self> {
        Self::start_with(Arc::new(upstream.clone()), ServerConfig::new()).await
    }

    /// Start a test server with an explicit upstream and config.
    pub async fn start_with(upstream: SharedUpstream, config: ServerConfig) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let clock = ManualClock::new();
        let cache = ResponseCache::with_clock(CacheConfig::default(), Arc::new(clock.clone()));
        let config = config
            .with_bind_address(addr)
            .with_request_logging(false);

        let server = Server::new(config, upstream, cache, SessionKeys::new(SECRET));

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            clock,
            keys: SessionKeys::new(SECRET),
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Mint a session token for `subject`.
    pub fn token(&self, subject: &str) -> String {
        self.keys
            .issue(
                subject,
                &Credentials::new(format!("{subject}-upstream"), "moscow"),
                Duration::from_secs(600),
            )
            .expect("failed to issue token")
    }

    /// Get a request builder authenticated as `subject`.
    pub fn get_as(&self, subject: &str, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url(), path))
            .bearer_auth(self.token(subject))
    }

    /// Get an unauthenticated request builder.
    pub fn get_anonymous(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    /// Stop the server and wait for it to exit.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            timeout(Duration::from_secs(5), handle).await??;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
