//! HTTP implementation of [`Upstream`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::Upstream;
use crate::classify::{ErrorClassifier, PrefixClassifier, RawUpstreamError, UpstreamErrorBody};
use crate::credentials::Credentials;
use crate::error::{Result, UpstreamError};
use crate::normalize::normalize;
use crate::resource::Resource;

/// Default timeout for upstream requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream API client over HTTP.
///
/// Each city may be served by its own regional base URL; unknown cities
/// fall back to the default base URL.
#[derive(Clone)]
pub struct HttpUpstream {
    inner: Arc<UpstreamInner>,
}

/// Inner client state (shared across clones).
struct UpstreamInner {
    http: reqwest::Client,
    base_url: Url,
    city_urls: HashMap<String, Url>,
    timeout: Duration,
    classifier: Arc<dyn ErrorClassifier>,
}

impl HttpUpstream {
    /// Create a new client builder.
    pub fn builder() -> UpstreamBuilder {
        UpstreamBuilder::new()
    }

    /// Get the default base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Base URL serving `city`.
    pub fn base_url_for(&self, city: &str) -> &Url {
        self.inner
            .city_urls
            .get(&city.to_lowercase())
            .unwrap_or(&self.inner.base_url)
    }

    /// Build the request URL for a resource.
    pub(crate) fn url(&self, credentials: &Credentials, resource: &Resource) -> Result<Url> {
        let mut url = self.base_url_for(&credentials.city).clone();

        let cannot_be_base = format!("Base URL cannot be a base: {}", url);
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Config(cannot_be_base))?
            .pop_if_empty()
            .extend(resource.path_segments());

        if let Some((name, value)) = resource.query() {
            url.query_pairs_mut().append_pair(name, &value);
        }

        Ok(url)
    }

    /// Perform the GET and decode the body, without classifying failures.
    async fn get_json(
        &self,
        credentials: &Credentials,
        url: Url,
    ) -> std::result::Result<Value, RawUpstreamError> {
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(&credentials.access_token)
            .timeout(self.inner.timeout)
            .send()
            .await
            .map_err(|e| RawUpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are best-effort; a body we can't parse is just absent.
            let body = response.json::<UpstreamErrorBody>().await.ok();
            return Err(RawUpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RawUpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, credentials: &Credentials, resource: &Resource) -> Result<Value> {
        let url = self.url(credentials, resource)?;
        debug!(resource = %resource, city = %credentials.city, url = %url, "Calling upstream");

        let outcome = match self.get_json(credentials, url).await {
            Ok(payload) => normalize(resource, payload),
            Err(raw) => Err(raw),
        };

        outcome.map_err(|raw| {
            let error = self.inner.classifier.classify(&raw, resource);
            warn!(
                resource = %resource,
                failure = %raw.describe(),
                classified = %error,
                "Upstream request failed"
            );
            error
        })
    }
}

impl std::fmt::Debug for HttpUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUpstream")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cities", &self.inner.city_urls.keys().collect::<Vec<_>>())
            .field("timeout", &self.inner.timeout)
            .field("classifier", &self.inner.classifier)
            .finish()
    }
}

/// Builder for creating an [`HttpUpstream`].
#[derive(Debug)]
pub struct UpstreamBuilder {
    base_url: Option<String>,
    city_urls: HashMap<String, String>,
    timeout: Duration,
    user_agent: Option<String>,
    classifier: Option<Arc<dyn ErrorClassifier>>,
}

impl UpstreamBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            city_urls: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            classifier: None,
        }
    }

    /// Set the default base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Route a city to its own regional base URL. City names are matched
    /// case-insensitively.
    pub fn city_url(mut self, city: impl Into<String>, url: impl Into<String>) -> Self {
        self.city_urls.insert(city.into().to_lowercase(), url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Replace the error classifier.
    pub fn classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpUpstream> {
        let base_url = self
            .base_url
            .ok_or_else(|| UpstreamError::Config("base_url is required".to_string()))?;
        let base_url = parse_base_url(&base_url)?;

        let city_urls = self
            .city_urls
            .into_iter()
            .map(|(city, url)| Ok((city, parse_base_url(&url)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("dnevnik/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| UpstreamError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(PrefixClassifier::default()));

        Ok(HttpUpstream {
            inner: Arc::new(UpstreamInner {
                http,
                base_url,
                city_urls,
                timeout: self.timeout,
                classifier,
            }),
        })
    }
}

impl Default for UpstreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse and normalize a base URL so path segments append cleanly.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(UpstreamError::Config(format!(
            "Base URL cannot be a base: {}",
            raw
        )));
    }
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}
