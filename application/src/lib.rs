//! Application layer for answer-checker
//!
//! This crate contains use cases, port definitions, application
//! configuration and the [`AppContext`] that ties them together.
//! It depends only on the domain layer.

pub mod config;
pub mod context;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_LANGUAGE, DEFAULT_SYSTEM_PROMPT, ReviewParams};
pub use context::{AppContext, ReviewError};
pub use ports::{
    card_source::{CardError, CardSource},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    progress::{NoProgress, ProgressNotifier},
    review_logger::{NoReviewLogger, ReviewEvent, ReviewLogger},
};
pub use use_cases::evaluate_answer::{
    EvaluateAnswerError, EvaluateAnswerInput, EvaluateAnswerOutput, EvaluateAnswerUseCase,
};
pub use use_cases::follow_up::{FollowUpError, FollowUpInput, FollowUpOutput, FollowUpUseCase};
