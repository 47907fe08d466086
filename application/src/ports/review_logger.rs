//! Port for structured review logging.
//!
//! Defines the [`ReviewLogger`] trait for recording review events
//! (prompts sent, replies received, verdicts extracted) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures every
//! exchange in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured review event for logging.
///
/// Each event has a type string and a JSON payload; the adapter adds the
/// timestamp when it writes the record.
pub struct ReviewEvent {
    /// Event type identifier (e.g., "prompt", "reply", "verdict", "timeout").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ReviewEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging review events to a structured log.
///
/// The `log` method is synchronous and non-fallible: logging failures are
/// silently ignored and never interrupt a review.
pub trait ReviewLogger: Send + Sync {
    /// Record a review event.
    fn log(&self, event: ReviewEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoReviewLogger;

impl ReviewLogger for NoReviewLogger {
    fn log(&self, _event: ReviewEvent) {}
}
