//! Chat backends
//!
//! `process_message` behind one capability with interchangeable
//! implementations:
//! - `MockBackend`: the local rule-based assistant, always available
//! - `RemoteBackend`: an HTTP agent service speaking the `/api/chat` envelope
//! - `FallbackBackend`: remote first, mock when the remote is unavailable

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::agent::MockAssistant;
use crate::config::{AssistantConfig, BackendMode};
use crate::error::AssistantError;
use crate::models::{ChatRequest, ChatResponse};
use crate::Result;

/// Anything that can answer a chat turn
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn process_message(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Local mock assistant exposed as a backend
pub struct MockBackend {
    assistant: Arc<MockAssistant>,
}

impl MockBackend {
    pub fn new(assistant: Arc<MockAssistant>) -> Self {
        Self { assistant }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn process_message(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.assistant
            .process_message(
                request.user_id.as_deref(),
                &request.message,
                &request.previous_messages,
            )
            .await
    }
}

/// Response envelope of the remote `/api/chat` endpoint
#[derive(Debug, Deserialize)]
struct RemoteEnvelope {
    success: bool,
    data: Option<ChatResponse>,
    error: Option<String>,
}

/// HTTP client for a remote agent service (connection-pooled)
pub struct RemoteBackend {
    client: Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    /// Every failure on this path is reported as `Unavailable`.
    async fn process_message(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::Unavailable(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Unavailable(format!(
                "{} returned {}",
                url, status
            )));
        }

        let envelope: RemoteEnvelope = response
            .json()
            .await
            .map_err(|e| AssistantError::Unavailable(format!("invalid response body: {}", e)))?;

        match envelope {
            RemoteEnvelope {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            RemoteEnvelope { error, .. } => Err(AssistantError::Unavailable(
                error.unwrap_or_else(|| "remote backend returned no data".to_string()),
            )),
        }
    }
}

/// Primary backend with the mock as local fallback
pub struct FallbackBackend {
    primary: Arc<dyn ChatBackend>,
    fallback: Arc<dyn ChatBackend>,
}

impl FallbackBackend {
    pub fn new(primary: Arc<dyn ChatBackend>, fallback: Arc<dyn ChatBackend>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ChatBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn process_message(&self, request: ChatRequest) -> Result<ChatResponse> {
        match self.primary.process_message(request.clone()).await {
            Err(e) if e.is_unavailable() => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "Chat backend unavailable, falling back: {}",
                    e
                );
                self.fallback.process_message(request).await
            }
            other => other,
        }
    }
}

/// Select the chat backend from configuration
pub fn build_backend(config: &AssistantConfig, assistant: Arc<MockAssistant>) -> Result<Arc<dyn ChatBackend>> {
    let mock: Arc<dyn ChatBackend> = Arc::new(MockBackend::new(assistant));

    match (config.backend, config.backend_url.as_deref()) {
        (BackendMode::Remote, Some(url)) => {
            info!("Chat backend: remote ({}) with mock fallback", url);
            let remote = Arc::new(RemoteBackend::new(url, config.backend_timeout)?);
            Ok(Arc::new(FallbackBackend::new(remote, mock)))
        }
        (BackendMode::Remote, None) => Err(AssistantError::ConfigError(
            "remote backend selected without CHAT_BACKEND_URL".to_string(),
        )),
        (BackendMode::Mock, _) => {
            info!("Chat backend: mock");
            Ok(mock)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ReplyPacing;
    use crate::models::Intent;
    use crate::quote::Quoter;
    use crate::state::InMemoryContextStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mock_assistant() -> Arc<MockAssistant> {
        Arc::new(MockAssistant::new(
            Box::new(InMemoryContextStore::new()),
            Quoter::default(),
            ReplyPacing::immediate(),
        ))
    }

    struct DownBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for DownBackend {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn process_message(&self, _request: ChatRequest) -> Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AssistantError::Unavailable("connection refused".to_string()))
        }
    }

    struct MisconfiguredBackend;

    #[async_trait]
    impl ChatBackend for MisconfiguredBackend {
        fn name(&self) -> &'static str {
            "misconfigured"
        }

        async fn process_message(&self, _request: ChatRequest) -> Result<ChatResponse> {
            Err(AssistantError::ConfigError("no credentials".to_string()))
        }
    }

    #[tokio::test]
    async fn test_mock_backend_answers() {
        let backend = MockBackend::new(mock_assistant());
        let reply = backend
            .process_message(ChatRequest::new("m1", "I need a loan"))
            .await
            .unwrap();
        assert_eq!(reply.intent, Some(Intent::Credit));
        assert_eq!(reply.user_id, "m1");
    }

    #[tokio::test]
    async fn test_fallback_on_unavailable() {
        let down = Arc::new(DownBackend {
            calls: AtomicUsize::new(0),
        });
        let backend = FallbackBackend::new(down.clone(), Arc::new(MockBackend::new(mock_assistant())));

        let reply = backend
            .process_message(ChatRequest::new("f1", "swap 2 ETH for USDC"))
            .await
            .unwrap();
        assert_eq!(reply.intent, Some(Intent::PrivateTrade));
        assert_eq!(down.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_swallowed() {
        let backend = FallbackBackend::new(
            Arc::new(MisconfiguredBackend),
            Arc::new(MockBackend::new(mock_assistant())),
        );
        let err = backend
            .process_message(ChatRequest::new("f2", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_unavailable() {
        // nothing listens on port 9 (discard) locally
        let remote = RemoteBackend::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = remote
            .process_message(ChatRequest::new("r1", "hello"))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_build_backend_selection() {
        let mock = build_backend(&AssistantConfig::default(), mock_assistant()).unwrap();
        assert_eq!(mock.name(), "mock");

        let config = AssistantConfig {
            backend: BackendMode::Remote,
            backend_url: Some("http://127.0.0.1:9".to_string()),
            ..AssistantConfig::default()
        };
        let remote = build_backend(&config, mock_assistant()).unwrap();
        assert_eq!(remote.name(), "remote");

        // falls back to the local mock
        let reply = remote
            .process_message(ChatRequest::new("b1", "hello"))
            .await
            .unwrap();
        assert!(reply.response.contains("Hi!"));
    }
}
