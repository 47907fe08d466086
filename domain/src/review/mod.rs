//! Review domain: what is being graded and what the grade looks like.
//!
//! - [`difficulty::DifficultyLevel`]: the four scheduler buttons
//! - [`evaluation::EvaluationRecord`]: the structured verdict on an answer
//! - [`card::CardContent`]: question text and accepted answers of a card
//! - [`request::RequestContext`]: input of the prompt builder
//! - [`conversation::ReviewSession`]: caller-side memory for follow-ups

pub mod card;
pub mod conversation;
pub mod difficulty;
pub mod evaluation;
pub mod request;
