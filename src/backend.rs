//! Message backends
//!
//! The chat flow talks to an injectable `MessageBackend` rather than the HTTP
//! client directly, so the controller can be exercised in tests (and run
//! offline) with a deterministic local implementation instead of timers or a
//! live server.

use crate::api::types::{Agent, Message};
use crate::api::ApiClient;
use crate::error::ApiError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A destination for user messages that produces assistant replies
#[async_trait]
pub trait MessageBackend: Send + Sync {
    /// Deliver `text` to `agent` and return the assistant's reply
    async fn send(&self, agent: &Agent, text: &str) -> Result<Message, ApiError>;
}

/// Backend that delegates to the REST API
pub struct HttpMessageBackend {
    client: Arc<ApiClient>,
}

impl HttpMessageBackend {
    /// Create a backend over the given API client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageBackend for HttpMessageBackend {
    async fn send(&self, agent: &Agent, text: &str) -> Result<Message, ApiError> {
        self.client.send_message(&agent.id, text).await
    }
}

/// Deterministic local backend, used when no server is available and in tests
///
/// The reply embeds the agent name and the user text, so assertions do not
/// depend on wall-clock time or randomness. The delay exists only to mimic a
/// thinking assistant in the UI; tests pass `Duration::ZERO`.
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    /// Create a simulated backend that replies after `delay`
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Create a simulated backend that replies immediately
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl MessageBackend for SimulatedBackend {
    async fn send(&self, agent: &Agent, text: &str) -> Result<Message, ApiError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Message::assistant(format!(
            "This is a reply from {}: {}",
            agent.name, text
        )))
    }
}
