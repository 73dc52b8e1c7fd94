//! Pluggable advisor backend abstraction
//!
//! # Architecture
//!
//! - `AdvisorBackend` trait: one chat completion per call, plus health and identity
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend` (Groq and friends), `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AdvisorConfig::load(None)?;
//! let client = AIClient::from_config(&config)?;
//! let reply = client.complete(&request).await?;
//! ```

mod mock;
mod openai_compatible;
pub mod types;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;

use crate::config::{AdvisorConfig, BackendKind};
use crate::error::Result;

/// Trait defining the interface for all advisor backends
///
/// Backends must be Send + Sync so one client can serve many sessions.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// Send a request and return the assistant's reply text
    ///
    /// Every failure (transport, non-2xx, timeout, malformed body) surfaces as
    /// `Error::AdvisorClient`. No retries.
    async fn complete(&self, request: &AdvisorRequest) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the configured default model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisor client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI-compatible chat completions (Groq by default)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing and offline use
    Mock(MockBackend),
}

impl AIClient {
    /// Build the client selected by the configuration
    ///
    /// The real backend requires an API key; a missing key is a config error.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        match config.backend {
            BackendKind::OpenaiCompatible => {
                let api_key = config.require_api_key()?;
                let backend = OpenAICompatibleBackend::with_api_key(
                    &config.base_url,
                    config.model.as_str(),
                    api_key,
                )
                .with_timeout(config.timeout)?;
                Ok(AIClient::OpenAICompatible(backend))
            }
            BackendKind::Mock => {
                tracing::warn!("Using mock advisor backend; replies are canned");
                Ok(AIClient::Mock(MockBackend::new()))
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AdvisorBackend for AIClient {
    async fn complete(&self, request: &AdvisorRequest) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(request).await,
            AIClient::Mock(b) => b.complete(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_from_config_requires_key() {
        let config = AdvisorConfig::default();
        assert!(matches!(
            AIClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_config_openai() {
        let config = AdvisorConfig {
            api_key: Some("gsk_test".into()),
            base_url: "http://localhost:8080/v1/".into(),
            ..AdvisorConfig::default()
        };
        let client = AIClient::from_config(&config).unwrap();
        assert!(matches!(client, AIClient::OpenAICompatible(_)));
        assert_eq!(client.host(), "http://localhost:8080/v1");
        assert_eq!(client.model(), "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_from_config_mock() {
        let config = AdvisorConfig {
            backend: BackendKind::Mock,
            ..AdvisorConfig::default()
        };
        let client = AIClient::from_config(&config).unwrap();
        assert!(client.health_check().await);
        assert_eq!(client.host(), "mock://localhost");
    }
}
