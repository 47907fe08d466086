//! Prompt domain
//!
//! The grading rubric and follow-up templates sent to the LLM. The rubric's
//! output contract is what [`crate::extraction`] parses, so the two move together.

mod template;
mod thresholds;

pub use template::{INVALID_REQUEST_TYPE, PromptBuilder, PromptPair};
pub use thresholds::TimeThresholds;
