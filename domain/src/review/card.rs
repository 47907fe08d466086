//! Card content as seen by the prompt builder

use serde::{Deserialize, Serialize};

/// Host-side identifier of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub i64);

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the card source hands over for the card under review.
///
/// `ordinal` is only set for cloze cards and selects the tested blank
/// (`c{ordinal + 1}`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardContent {
    pub question_text: String,
    pub accepted_answers: Vec<String>,
    pub ordinal: Option<u32>,
}

impl CardContent {
    pub fn new(question_text: impl Into<String>, accepted_answers: Vec<String>) -> Self {
        Self {
            question_text: question_text.into(),
            accepted_answers,
            ordinal: None,
        }
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn is_cloze(&self) -> bool {
        self.ordinal.is_some()
    }

    /// Number of the tested cloze blank (1-based), if any.
    pub fn cloze_number(&self) -> Option<u32> {
        self.ordinal.and_then(|ord| ord.checked_add(1))
    }

    /// Accepted answers joined the way the rubric quotes them.
    pub fn joined_answers(&self) -> String {
        self.accepted_answers.join(", ")
    }
}
