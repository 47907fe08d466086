//! User-facing failure categories.
//!
//! Every failure the host UI can show maps to exactly one [`ErrorKind`].
//! [`help_text_for`] gives the canned advice displayed under the error
//! headline; the match is exhaustive so a new kind cannot ship without text.

use serde::{Deserialize, Serialize};

/// Tagged failure category shown to the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The provider could not be reached.
    ApiConnection,
    /// The provider refused the request because of rate limiting.
    RateLimited,
    /// The provider call itself timed out.
    Timeout,
    /// The provider rejected the API key.
    InvalidApiKey,
    /// The provider answered with no text.
    EmptyResponse,
    /// The provider answered with something that is not a completion.
    MalformedResponse,
    /// The reply was received but no recommendation could be extracted.
    ExtractionMiss,
    /// A streamed reply never completed within the wait bound.
    ResponseTimedOut,
    /// The current card could not be read.
    CardUnavailable,
    /// The request kind is not one the prompt builder knows.
    InvalidRequest,
}

impl ErrorKind {
    /// Short headline for the failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::ApiConnection => "Failed to connect to the AI server.",
            ErrorKind::RateLimited => "The AI server is rate limiting requests.",
            ErrorKind::Timeout => "The AI server did not answer in time.",
            ErrorKind::InvalidApiKey => "Invalid API key.",
            ErrorKind::EmptyResponse => "The AI returned an empty response.",
            ErrorKind::MalformedResponse => "Unable to process the AI response.",
            ErrorKind::ExtractionMiss => "Could not determine a recommendation.",
            ErrorKind::ResponseTimedOut => "Response time exceeded.",
            ErrorKind::CardUnavailable => "Could not retrieve card information.",
            ErrorKind::InvalidRequest => "Invalid request type.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

/// Help text shown under the headline for an [`ErrorKind`].
pub fn help_text_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ApiConnection => "Please verify your internet connection.",
        ErrorKind::RateLimited => "You're being rate-limited. Please try again later.",
        ErrorKind::Timeout => "Please check your internet connection and try again.",
        ErrorKind::InvalidApiKey => {
            "Please check your API key in Settings and ensure it is entered correctly."
        }
        ErrorKind::EmptyResponse => {
            "Please try again. If the issue persists, consider selecting a different AI model in Settings."
        }
        ErrorKind::MalformedResponse => {
            "Please try again later. If the issue continues, consider selecting a different AI model in Settings."
        }
        ErrorKind::ExtractionMiss => {
            "The reply did not contain a usable evaluation. Please try asking for the answer again."
        }
        ErrorKind::ResponseTimedOut => "The reply never finished. Please try again.",
        ErrorKind::CardUnavailable => "Open a card in the reviewer and try again.",
        ErrorKind::InvalidRequest => "This action is not supported.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorKind; 10] = [
        ErrorKind::ApiConnection,
        ErrorKind::RateLimited,
        ErrorKind::Timeout,
        ErrorKind::InvalidApiKey,
        ErrorKind::EmptyResponse,
        ErrorKind::MalformedResponse,
        ErrorKind::ExtractionMiss,
        ErrorKind::ResponseTimedOut,
        ErrorKind::CardUnavailable,
        ErrorKind::InvalidRequest,
    ];

    #[test]
    fn every_kind_has_help_text() {
        for kind in ALL {
            assert!(!help_text_for(kind).is_empty(), "{kind:?} has no help text");
            assert!(!kind.user_message().is_empty());
        }
    }

    #[test]
    fn timeout_and_extraction_miss_read_differently() {
        assert_ne!(
            ErrorKind::ResponseTimedOut.user_message(),
            ErrorKind::ExtractionMiss.user_message()
        );
        assert_ne!(
            help_text_for(ErrorKind::ResponseTimedOut),
            help_text_for(ErrorKind::ExtractionMiss)
        );
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ResponseTimedOut).unwrap();
        assert_eq!(json, "\"response_timed_out\"");
    }
}
