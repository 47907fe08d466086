//! LLM Gateway port
//!
//! Defines the interface for sending a prompt pair to an LLM provider.
//! Transport, vendor choice and retry policy belong to the adapters.

use async_trait::async_trait;
use checker_domain::{ErrorKind, PromptPair, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    InvalidApiKey(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// The user-facing category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::ConnectionError(_) | GatewayError::TransportClosed => {
                ErrorKind::ApiConnection
            }
            GatewayError::RateLimited(_) => ErrorKind::RateLimited,
            GatewayError::InvalidApiKey(_) => ErrorKind::InvalidApiKey,
            GatewayError::Timeout => ErrorKind::Timeout,
            GatewayError::RequestFailed(_) | GatewayError::Other(_) => {
                ErrorKind::MalformedResponse
            }
        }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer reaches an LLM.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Human-readable name of the model behind this gateway.
    fn model_name(&self) -> &str;

    /// Send a (system, user) pair and wait for the whole reply.
    async fn call(&self, prompt: &PromptPair) -> Result<String, GatewayError>;

    /// Send a (system, user) pair and receive the reply as a stream.
    ///
    /// Default implementation calls `call()` and wraps the result in a single
    /// `Completed` event, so non-streaming adapters work unchanged.
    async fn call_streaming(&self, prompt: &PromptPair) -> Result<StreamHandle, GatewayError> {
        let result = self.call(prompt).await?;
        let (tx, rx) = mpsc::channel(1);
        // Send Completed event; a dropped receiver is fine
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}

/// Handle for receiving streaming events from a gateway call.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`; chunk order is the order the
/// adapter sent them in.
#[derive(Debug)]
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the adapter dropped its sender.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed: return what we have
        Ok(full_text)
    }
}
