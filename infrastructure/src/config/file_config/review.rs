//! Review configuration from TOML (`[review]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [review]
//! easy = 5
//! good = 40
//! hard = 60
//! language = "English"
//! context_window = 10
//! response_timeout_seconds = 10
//! ```

use checker_application::{DEFAULT_LANGUAGE, DEFAULT_SYSTEM_PROMPT};
use checker_domain::{DEFAULT_CONTEXT_WINDOW, DEFAULT_RESPONSE_TIMEOUT, TimeThresholds};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw review configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    /// Seconds under which a correct answer is Easy
    pub easy: u64,
    /// Seconds under which a correct answer is Good
    pub good: u64,
    /// Seconds under which a correct answer is Hard
    pub hard: u64,
    /// System message sent with every request
    pub system_prompt: Option<String>,
    /// Language every reply must be written in
    pub language: String,
    /// Conversation turns included in follow-up prompts
    pub context_window: usize,
    /// Wait bound for a streamed reply, from its first chunk
    pub response_timeout_seconds: u64,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        let thresholds = TimeThresholds::default();
        Self {
            easy: thresholds.easy,
            good: thresholds.good,
            hard: thresholds.hard,
            system_prompt: None,
            language: DEFAULT_LANGUAGE.to_string(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            response_timeout_seconds: DEFAULT_RESPONSE_TIMEOUT.as_secs(),
        }
    }
}

impl FileReviewConfig {
    /// Thresholds as configured, unvalidated.
    pub fn thresholds(&self) -> TimeThresholds {
        TimeThresholds {
            easy: self.easy,
            good: self.good,
            hard: self.hard,
        }
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_seconds)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}
