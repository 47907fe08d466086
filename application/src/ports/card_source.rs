//! Card source port
//!
//! Supplies the card under review: its question text, the accepted answers
//! and, for cloze cards, the ordinal of the blank being tested.

use checker_domain::{CardContent, CardId, ErrorKind};
use thiserror::Error;

/// Errors that can occur while reading the current card
#[derive(Error, Debug)]
pub enum CardError {
    #[error("No card is under review")]
    NoCard,

    #[error("Could not read card: {0}")]
    Unreadable(String),
}

impl CardError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::CardUnavailable
    }
}

/// Where the card under review comes from.
pub trait CardSource: Send + Sync {
    /// Identifier of the current card, used to reset follow-up history.
    fn card_id(&self) -> Option<CardId>;

    /// Question text, accepted answers and cloze ordinal of the current card.
    fn card_content(&self) -> Result<CardContent, CardError>;
}
