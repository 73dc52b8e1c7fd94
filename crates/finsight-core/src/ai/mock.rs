//! Mock backend for testing
//!
//! Replies from a script (or a canned default) and records every request it
//! receives. Useful for unit tests and for running the app without an API key.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::AdvisorRequest;
use super::AdvisorBackend;

const DEFAULT_REPLY: &str = "Your spending looks balanced. \
    Consider setting aside a fixed share of income as savings each month.";

/// Mock advisor backend for testing
///
/// Clones share the same script and request log.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    failure: Option<String>,
    replies: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<AdvisorRequest>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failure: None,
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Create a backend whose every completion fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Create a backend that answers with `replies` in order, then the default
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        if let Ok(mut queue) = backend.replies.lock() {
            queue.extend(replies.into_iter().map(Into::into));
        }
        backend
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<AdvisorRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn complete(&self, request: &AdvisorRequest) -> Result<String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        if let Some(ref message) = self.failure {
            return Err(Error::AdvisorClient(message.clone()));
        }

        let scripted = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        Ok(scripted.unwrap_or_else(|| DEFAULT_REPLY.to_string()))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
