//! Follow-up use case.
//!
//! Handles the free-text requests made after an answer was graded: a
//! question about the card, a joke, or advice on editing the card. The
//! reply is prose; it is streamed through the shared accumulator and
//! complete when the transport ends the stream.

use crate::config::ReviewParams;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::ProgressNotifier;
use crate::ports::review_logger::{NoReviewLogger, ReviewEvent, ReviewLogger};
use crate::use_cases::shared::{StreamEnd, drive_stream};
use checker_domain::{
    CardContent, ConversationTurn, DomainError, ErrorKind, PreviousExchange, PromptPair,
    RequestContext, RequestId, RequestKind, StreamMode, StreamingAccumulator,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Errors that can occur during a follow-up request.
#[derive(Error, Debug)]
pub enum FollowUpError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("Invalid request type: {0}")]
    UnknownKind(String),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("No response from model")]
    EmptyResponse,

    #[error("Response timed out after {timeout:?}")]
    TimedOut { timeout: Duration, partial: String },
}

impl FollowUpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FollowUpError::InvalidRequest(_) | FollowUpError::UnknownKind(_) => {
                ErrorKind::InvalidRequest
            }
            FollowUpError::GatewayError(e) => e.kind(),
            FollowUpError::EmptyResponse => ErrorKind::EmptyResponse,
            FollowUpError::TimedOut { .. } => ErrorKind::ResponseTimedOut,
        }
    }
}

/// Input for the [`FollowUpUseCase`].
#[derive(Debug, Clone)]
pub struct FollowUpInput {
    /// Request kind by name, as the host UI sends it.
    pub kind: String,
    pub card: CardContent,
    /// Question text (question requests only).
    pub question: Option<String>,
    pub previous: PreviousExchange,
    pub history: Vec<ConversationTurn>,
}

impl FollowUpInput {
    pub fn new(kind: impl Into<String>, card: CardContent) -> Self {
        Self {
            kind: kind.into(),
            card,
            question: None,
            previous: PreviousExchange::default(),
            history: Vec::new(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_previous(mut self, previous: PreviousExchange) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Output of the [`FollowUpUseCase`].
#[derive(Debug, Clone)]
pub struct FollowUpOutput {
    pub kind: RequestKind,
    pub reply: String,
}

/// Use case for question, joke and edit-advice requests.
pub struct FollowUpUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    params: ReviewParams,
    accumulator: Arc<Mutex<StreamingAccumulator>>,
    logger: Arc<dyn ReviewLogger>,
    next_request: AtomicU64,
}

impl<G: LlmGateway + 'static> FollowUpUseCase<G> {
    pub fn new(gateway: Arc<G>, params: ReviewParams) -> Self {
        let accumulator = StreamingAccumulator::new(params.response_timeout);
        Self {
            gateway,
            params,
            accumulator: Arc::new(Mutex::new(accumulator)),
            logger: Arc::new(NoReviewLogger),
            next_request: AtomicU64::new(1),
        }
    }

    /// Share an accumulator with other use cases.
    pub fn with_accumulator(mut self, accumulator: Arc<Mutex<StreamingAccumulator>>) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Create with a review logger.
    pub fn with_review_logger(mut self, logger: Arc<dyn ReviewLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Build the prompt pair without calling the gateway.
    ///
    /// An unknown kind name is reported as [`FollowUpError::UnknownKind`]
    /// once the builder returned its sentinel pair.
    pub fn prompt(
        &self,
        input: &FollowUpInput,
    ) -> Result<(RequestKind, PromptPair), FollowUpError> {
        let mut ctx = RequestContext::new(RequestKind::Question, input.card.clone())
            .with_previous(input.previous.clone());
        if let Some(question) = &input.question {
            ctx = ctx.with_question(question.clone());
        }

        let pair = self
            .params
            .prompt_builder()
            .build_named(&input.kind, ctx, &input.history)?;
        if pair.is_invalid() {
            return Err(FollowUpError::UnknownKind(input.kind.clone()));
        }

        let kind = input.kind.parse::<RequestKind>()?;
        Ok((kind, pair))
    }

    pub async fn execute(
        &self,
        input: FollowUpInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<FollowUpOutput, FollowUpError> {
        let (kind, prompt) = self.prompt(&input)?;
        self.logger.log(ReviewEvent::new(
            "prompt",
            serde_json::json!({
                "kind": kind.as_str(),
                "model": self.gateway.model_name(),
                "system": prompt.system,
                "user": prompt.user,
            }),
        ));

        let id = RequestId::new(format!(
            "{}-{}",
            kind,
            self.next_request.fetch_add(1, Ordering::Relaxed)
        ));
        debug!("Streaming {} via {}", id, self.gateway.model_name());

        progress.on_request_start(kind, self.gateway.model_name());
        let end = match self.gateway.call_streaming(&prompt).await {
            Ok(handle) => {
                drive_stream(handle, &self.accumulator, &id, StreamMode::FreeText, progress).await
            }
            Err(e) => Err(e),
        };
        progress.on_request_end(matches!(end, Ok(StreamEnd::Finished(_))));

        match end? {
            StreamEnd::Finished(reply) | StreamEnd::Complete { text: reply, .. } => {
                if reply.trim().is_empty() {
                    return Err(FollowUpError::EmptyResponse);
                }
                self.logger.log(ReviewEvent::new(
                    "reply",
                    serde_json::json!({
                        "kind": kind.as_str(),
                        "bytes": reply.len(),
                        "text": reply,
                    }),
                ));
                Ok(FollowUpOutput { kind, reply })
            }
            StreamEnd::TimedOut(partial) => {
                warn!("{} timed out", id);
                Err(FollowUpError::TimedOut {
                    timeout: self.params.response_timeout,
                    partial,
                })
            }
        }
    }
}
