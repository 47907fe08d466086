//! Domain layer for answer-checker
//!
//! This crate contains the review logic: what a grade looks like, how the
//! grading prompt is built and how a verdict is pulled out of the model's
//! reply. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Verdict
//!
//! - **DifficultyLevel**: the four scheduler buttons (`Again`, `Hard`, `Good`, `Easy`)
//! - **EvaluationRecord**: evaluation, recommendation, answer and reference
//!
//! ## Reply pipeline
//!
//! PromptBuilder → (LLM call) → StreamingAccumulator (if streamed) → extraction
//!
//! Extraction is last-match-wins: when a reply contains several JSON-shaped
//! objects, the one closest to the end is the model's final decision.

pub mod core;
pub mod extraction;
pub mod prompt;
pub mod review;
pub mod session;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    error_kind::{ErrorKind, help_text_for},
};
pub use extraction::{
    Extraction, ExtractionMode, extract, extract_full_record, extract_recommendation,
    is_response_complete,
};
pub use prompt::{INVALID_REQUEST_TYPE, PromptBuilder, PromptPair, TimeThresholds};
pub use review::{
    card::{CardContent, CardId},
    conversation::{
        ConversationHistory, ConversationTurn, DEFAULT_CONTEXT_WINDOW, ReviewSession, Role,
    },
    difficulty::DifficultyLevel,
    evaluation::EvaluationRecord,
    request::{PreviousExchange, RequestContext, RequestKind},
};
pub use session::{
    accumulator::{
        ChunkOutcome, DEFAULT_RESPONSE_TIMEOUT, RequestId, StreamMode, StreamState,
        StreamingAccumulator,
    },
    stream::StreamEvent,
};
