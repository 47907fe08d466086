//! Follow-up conversation state for the card under review.
//!
//! The core never remembers anything between requests on its own; the
//! caller keeps a [`ReviewSession`] and passes the relevant parts into the
//! next [`RequestContext`](super::request::RequestContext).

use super::card::CardId;
use super::evaluation::EvaluationRecord;
use super::request::PreviousExchange;
use serde::{Deserialize, Serialize};

/// Default number of turns included in follow-up prompts.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Who spoke a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// A single role-tagged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Turns exchanged about one card. Binding a different card starts over.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    card_id: Option<CardId>,
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the history to `card_id`, clearing it if it belonged to another card.
    ///
    /// Returns `true` when the history was reset.
    pub fn bind_card(&mut self, card_id: CardId) -> bool {
        if self.card_id == Some(card_id) {
            return false;
        }
        self.card_id = Some(card_id);
        self.turns.clear();
        true
    }

    pub fn card_id(&self) -> Option<CardId> {
        self.card_id
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// The last `window` turns, oldest first.
    pub fn recent(&self, window: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(window);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.card_id = None;
        self.turns.clear();
    }
}

/// Caller-side memory of the review in progress.
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    pub history: ConversationHistory,
    last_exchange: PreviousExchange,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `card_id`; everything remembered about another card is dropped.
    pub fn bind_card(&mut self, card_id: CardId) {
        if self.history.bind_card(card_id) {
            self.last_exchange = PreviousExchange::default();
        }
    }

    /// Remember the answer just graded.
    pub fn record_evaluation(
        &mut self,
        user_answer: impl Into<String>,
        elapsed_seconds: u64,
        evaluation: Option<EvaluationRecord>,
    ) {
        self.last_exchange = PreviousExchange {
            user_answer: Some(user_answer.into()),
            elapsed_seconds: Some(elapsed_seconds),
            evaluation,
        };
    }

    pub fn last_exchange(&self) -> &PreviousExchange {
        &self.last_exchange
    }
}
