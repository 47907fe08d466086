//! Application-level configuration.
//!
//! - [`ReviewParams`]: rubric inputs and the streamed-reply wait bound

pub mod review_params;

pub use review_params::{DEFAULT_LANGUAGE, DEFAULT_SYSTEM_PROMPT, ReviewParams};
