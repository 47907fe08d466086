//! Domain error types

use thiserror::Error;

/// Domain-level errors.
///
/// These signal caller-side contract violations. Untrusted LLM output never
/// produces a `DomainError`; it degrades to "nothing extracted" instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing required field for {kind} request: {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Invalid time thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Unknown request type: {0}")]
    UnknownRequestKind(String),
}

impl DomainError {
    /// Check if this error came from an unrecognised request kind
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, DomainError::UnknownRequestKind(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let error = DomainError::MissingField {
            kind: "answer",
            field: "user_answer",
        };
        assert_eq!(
            error.to_string(),
            "Missing required field for answer request: user_answer"
        );
    }

    #[test]
    fn test_is_unknown_kind_check() {
        assert!(DomainError::UnknownRequestKind("poem".to_string()).is_unknown_kind());
        assert!(!DomainError::InvalidThresholds("x".to_string()).is_unknown_kind());
    }
}
