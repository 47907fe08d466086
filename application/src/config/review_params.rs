//! Review parameters: what the use cases need from configuration.
//!
//! [`ReviewParams`] is the application-layer view of the `[review]` config
//! section: rubric inputs for the prompt builder plus the wait bound of
//! streamed replies.

use checker_domain::{
    DEFAULT_CONTEXT_WINDOW, DEFAULT_RESPONSE_TIMEOUT, PromptBuilder, TimeThresholds,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_LANGUAGE: &str = "English";

/// Parameters controlling prompt building and reply waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewParams {
    pub thresholds: TimeThresholds,
    pub system_prompt: String,
    /// Language every reply must be written in.
    pub language: String,
    /// Conversation turns included in follow-up prompts.
    pub context_window: usize,
    /// Wait bound for a streamed reply, from its first chunk.
    pub response_timeout: Duration,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            thresholds: TimeThresholds::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl ReviewParams {
    // ==================== Builder Methods ====================

    pub fn with_thresholds(mut self, thresholds: TimeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_context_window(mut self, turns: usize) -> Self {
        self.context_window = turns;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// A prompt builder carrying these parameters.
    pub fn prompt_builder(&self) -> PromptBuilder {
        PromptBuilder::new(self.thresholds)
            .with_system_prompt(self.system_prompt.clone())
            .with_language(self.language.clone())
            .with_context_window(self.context_window)
    }
}
