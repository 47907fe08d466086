//! Evaluate Answer use case.
//!
//! Builds the grading prompt for a typed answer, sends it to the gateway
//! and extracts the verdict from the reply.
//!
//! Two entry points:
//!
//! - [`EvaluateAnswerUseCase::execute`] waits for the whole reply.
//! - [`EvaluateAnswerUseCase::execute_streaming`] feeds the reply through the
//!   shared [`StreamingAccumulator`] and returns as soon as a full record is
//!   present, or reports a timeout once the wait bound is exceeded.
//!
//! In both paths a reply without a full record still succeeds when it
//! carries a bare recommendation; only a reply with neither is an
//! extraction miss.

use crate::config::ReviewParams;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::ProgressNotifier;
use crate::ports::review_logger::{NoReviewLogger, ReviewEvent, ReviewLogger};
use crate::use_cases::shared::{StreamEnd, drive_stream};
use checker_domain::{
    CardContent, ConversationTurn, DifficultyLevel, DomainError, ErrorKind, EvaluationRecord,
    Extraction, PromptPair, RequestContext, RequestId, RequestKind, StreamMode,
    StreamingAccumulator, extract_full_record, extract_recommendation,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Errors that can occur while evaluating an answer.
#[derive(Error, Debug)]
pub enum EvaluateAnswerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("No response from model")]
    EmptyResponse,

    #[error("Could not determine a recommendation from the reply")]
    ExtractionMiss { reply: String },

    #[error("Response timed out after {timeout:?}")]
    TimedOut { timeout: Duration, partial: String },
}

impl EvaluateAnswerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluateAnswerError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            EvaluateAnswerError::GatewayError(e) => e.kind(),
            EvaluateAnswerError::EmptyResponse => ErrorKind::EmptyResponse,
            EvaluateAnswerError::ExtractionMiss { .. } => ErrorKind::ExtractionMiss,
            EvaluateAnswerError::TimedOut { .. } => ErrorKind::ResponseTimedOut,
        }
    }
}

/// Input for the [`EvaluateAnswerUseCase`].
#[derive(Debug, Clone)]
pub struct EvaluateAnswerInput {
    pub card: CardContent,
    pub user_answer: String,
    pub elapsed_seconds: u64,
    /// Recent conversation, for prompts that include it.
    pub history: Vec<ConversationTurn>,
}

impl EvaluateAnswerInput {
    pub fn new(card: CardContent, user_answer: impl Into<String>, elapsed_seconds: u64) -> Self {
        Self {
            card,
            user_answer: user_answer.into(),
            elapsed_seconds,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    fn context(&self) -> RequestContext {
        RequestContext::answer(self.card.clone(), &self.user_answer, self.elapsed_seconds)
    }
}

/// Output of the [`EvaluateAnswerUseCase`].
#[derive(Debug, Clone)]
pub struct EvaluateAnswerOutput {
    pub extraction: Extraction,
    /// The raw reply the verdict was extracted from.
    pub reply: String,
}

impl EvaluateAnswerOutput {
    pub fn recommendation(&self) -> DifficultyLevel {
        self.extraction.recommendation()
    }

    pub fn record(&self) -> Option<&EvaluationRecord> {
        self.extraction.record()
    }
}

/// Use case for grading one typed answer.
pub struct EvaluateAnswerUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    params: ReviewParams,
    accumulator: Arc<Mutex<StreamingAccumulator>>,
    logger: Arc<dyn ReviewLogger>,
    next_request: AtomicU64,
}

impl<G: LlmGateway + 'static> EvaluateAnswerUseCase<G> {
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
    pub fn prompt(&self, input: &EvaluateAnswerInput) -> Result<PromptPair, EvaluateAnswerError> {
        Ok(self
            .params
            .prompt_builder()
            .build(&input.context(), &input.history)?)
    }

    /// Grade the answer, waiting for the whole reply.
    pub async fn execute(
        &self,
        input: EvaluateAnswerInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<EvaluateAnswerOutput, EvaluateAnswerError> {
        let prompt = self.prompt(&input)?;
        self.log_prompt(&prompt, &input);

        progress.on_request_start(RequestKind::Answer, self.gateway.model_name());
        let result = self.gateway.call(&prompt).await;
        progress.on_request_end(result.is_ok());

        self.interpret(result?)
    }

    /// Grade the answer from a streamed reply.
    ///
    /// Returns as soon as a full evaluation record has arrived. When the
    /// stream ends first, the whole reply is searched for a record and then
    /// for a bare recommendation.
    pub async fn execute_streaming(
        &self,
        input: EvaluateAnswerInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<EvaluateAnswerOutput, EvaluateAnswerError> {
        let prompt = self.prompt(&input)?;
        self.log_prompt(&prompt, &input);

        let id = RequestId::new(format!(
            "answer-{}",
            self.next_request.fetch_add(1, Ordering::Relaxed)
        ));
        debug!("Streaming evaluation {} via {}", id, self.gateway.model_name());

        progress.on_request_start(RequestKind::Answer, self.gateway.model_name());
        let end = match self.gateway.call_streaming(&prompt).await {
            Ok(handle) => {
                drive_stream(handle, &self.accumulator, &id, StreamMode::Evaluation, progress)
                    .await
            }
            Err(e) => Err(e),
        };
        progress.on_request_end(matches!(
            end,
            Ok(StreamEnd::Complete { .. } | StreamEnd::Finished(_))
        ));

        match end? {
            StreamEnd::Complete { extraction, text } => {
                self.log_verdict(&extraction);
                Ok(EvaluateAnswerOutput {
                    extraction,
                    reply: text,
                })
            }
            StreamEnd::Finished(text) => self.interpret(text),
            StreamEnd::TimedOut(partial) => {
                warn!("Evaluation {} timed out", id);
                self.logger.log(ReviewEvent::new(
                    "timeout",
                    serde_json::json!({
                        "request_id": id.as_str(),
                        "partial": partial,
                    }),
                ));
                Err(EvaluateAnswerError::TimedOut {
                    timeout: self.params.response_timeout,
                    partial,
                })
            }
        }
    }

    fn interpret(&self, reply: String) -> Result<EvaluateAnswerOutput, EvaluateAnswerError> {
        if reply.trim().is_empty() {
            return Err(EvaluateAnswerError::EmptyResponse);
        }

        let extraction = extract_full_record(&reply)
            .map(Extraction::Record)
            .or_else(|| extract_recommendation(&reply).map(Extraction::Recommendation));

        match extraction {
            Some(extraction) => {
                self.log_verdict(&extraction);
                Ok(EvaluateAnswerOutput { extraction, reply })
            }
            None => {
                warn!("No recommendation found in {} byte reply", reply.len());
                self.logger.log(ReviewEvent::new(
                    "extraction_miss",
                    serde_json::json!({ "reply": reply }),
                ));
                Err(EvaluateAnswerError::ExtractionMiss { reply })
            }
        }
    }

    fn log_prompt(&self, prompt: &PromptPair, input: &EvaluateAnswerInput) {
        self.logger.log(ReviewEvent::new(
            "prompt",
            serde_json::json!({
                "kind": RequestKind::Answer.as_str(),
                "model": self.gateway.model_name(),
                "elapsed_seconds": input.elapsed_seconds,
                "system": prompt.system,
                "user": prompt.user,
            }),
        ));
    }

    fn log_verdict(&self, extraction: &Extraction) {
        info!("Recommendation: {}", extraction.recommendation());
        self.logger.log(ReviewEvent::new(
            "verdict",
            serde_json::json!({
                "recommendation": extraction.recommendation(),
                "record": extraction.record(),
            }),
        ));
    }
}
