//! Request context value objects.
//!
//! A [`RequestContext`] is built fresh for every user interaction and handed
//! to the prompt builder unchanged.

use super::card::CardContent;
use super::evaluation::EvaluationRecord;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What the user asked the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Grade the typed answer and recommend a difficulty.
    Answer,
    /// Free follow-up question about the card.
    Question,
    /// A joke about the card, tuned to how the review went.
    Joke,
    /// Advice on how to improve the card itself.
    EditAdvice,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Answer => "answer",
            RequestKind::Question => "question",
            RequestKind::Joke => "joke",
            RequestKind::EditAdvice => "edit_advice",
        }
    }

    /// Whether the reply must end with the JSON evaluation contract.
    pub fn expects_structured_reply(&self) -> bool {
        matches!(self, RequestKind::Answer)
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "answer" => Ok(RequestKind::Answer),
            "question" => Ok(RequestKind::Question),
            "joke" => Ok(RequestKind::Joke),
            "edit_advice" => Ok(RequestKind::EditAdvice),
            _ => Err(DomainError::UnknownRequestKind(s.to_string())),
        }
    }
}

/// The exchange preceding a follow-up request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviousExchange {
    pub user_answer: Option<String>,
    pub elapsed_seconds: Option<u64>,
    pub evaluation: Option<EvaluationRecord>,
}

/// Everything the prompt builder needs for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub kind: RequestKind,
    pub card: CardContent,
    /// The typed answer (answer requests only).
    pub user_answer: Option<String>,
    pub elapsed_seconds: u64,
    /// The follow-up question text (question requests only).
    pub question: Option<String>,
    pub previous: PreviousExchange,
}

impl RequestContext {
    pub fn new(kind: RequestKind, card: CardContent) -> Self {
        Self {
            kind,
            card,
            user_answer: None,
            elapsed_seconds: 0,
            question: None,
            previous: PreviousExchange::default(),
        }
    }

    /// Shorthand for an answer-evaluation request.
    pub fn answer(card: CardContent, user_answer: impl Into<String>, elapsed_seconds: u64) -> Self {
        Self::new(RequestKind::Answer, card)
            .with_user_answer(user_answer)
            .with_elapsed_seconds(elapsed_seconds)
    }

    // ==================== Builder Methods ====================

    pub fn with_user_answer(mut self, answer: impl Into<String>) -> Self {
        self.user_answer = Some(answer.into());
        self
    }

    pub fn with_elapsed_seconds(mut self, seconds: u64) -> Self {
        self.elapsed_seconds = seconds;
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_previous(mut self, previous: PreviousExchange) -> Self {
        self.previous = previous;
        self
    }

    /// Check the fields the request kind requires.
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing = |field| DomainError::MissingField {
            kind: self.kind.as_str(),
            field,
        };
        match self.kind {
            RequestKind::Answer if self.user_answer.is_none() => Err(missing("user_answer")),
            RequestKind::Question
                if self.question.as_deref().is_none_or(|q| q.trim().is_empty()) =>
            {
                Err(missing("question"))
            }
            _ => Ok(()),
        }
    }
}
