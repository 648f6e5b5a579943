//! Scripted in-memory upstream for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::Upstream;
use crate::credentials::Credentials;
use crate::error::{Result, UpstreamError};
use crate::resource::Resource;

/// A call the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub credentials: Credentials,
    pub resource: Resource,
}

/// Upstream whose responses are scripted per resource.
///
/// Responses for a resource are consumed in order; the last one keeps being
/// returned once the queue is down to it. A resource with nothing scripted
/// answers with [`UpstreamError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct MockUpstream {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Result<Value>>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockUpstream {
    /// Create a mock with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response (builder form).
    pub fn with_response(self, resource: &Resource, payload: Value) -> Self {
        self.push_response(resource, payload);
        self
    }

    /// Script a failure (builder form).
    pub fn with_error(self, resource: &Resource, error: UpstreamError) -> Self {
        self.push_error(resource, error);
        self
    }

    /// Queue a successful response.
    pub fn push_response(&self, resource: &Resource, payload: Value) {
        self.push(resource, Ok(payload));
    }

    /// Queue a failure.
    pub fn push_error(&self, resource: &Resource, error: UpstreamError) {
        self.push(resource, Err(error));
    }

    fn push(&self, resource: &Resource, outcome: Result<Value>) {
        self.scripts
            .lock()
            .entry(resource.canonical())
            .or_default()
            .push_back(outcome);
    }

    /// Total number of fetches received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of fetches received for one resource.
    pub fn calls_for(&self, resource: &Resource) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| &call.resource == resource)
            .count()
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn fetch(&self, credentials: &Credentials, resource: &Resource) -> Result<Value> {
        self.calls.lock().push(RecordedCall {
            credentials: credentials.clone(),
            resource: resource.clone(),
        });

        let mut scripts = self.scripts.lock();
        let Some(queue) = scripts.get_mut(&resource.canonical()) else {
            return Err(UpstreamError::Unavailable(format!(
                "no scripted response for {}",
                resource
            )));
        };

        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(UpstreamError::Unavailable("script exhausted".into())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(UpstreamError::Unavailable("script exhausted".into())))
        }
    }
}
