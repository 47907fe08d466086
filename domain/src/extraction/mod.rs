//! Reply extraction
//!
//! Pulls an [`EvaluationRecord`](crate::review::evaluation::EvaluationRecord)
//! or a bare [`DifficultyLevel`](crate::review::difficulty::DifficultyLevel)
//! out of untrusted model output. Last match wins.

pub mod candidates;
pub mod extractor;
pub mod normalize;

pub use extractor::{
    Extraction, ExtractionMode, extract, extract_full_record, extract_recommendation,
    is_response_complete,
};
