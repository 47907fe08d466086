//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod evaluate_answer;
pub mod follow_up;
pub(crate) mod shared;
