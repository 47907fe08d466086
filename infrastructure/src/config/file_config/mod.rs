//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! once validated.

mod output;
mod provider;
mod review;

pub use output::{FileLogConfig, FileOutputConfig, FileOutputFormat};
pub use provider::{FileInputFormat, FileProviderConfig};
pub use review::FileReviewConfig;

use checker_application::ReviewParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("review thresholds must be > 0 and ordered easy <= good <= hard (got {easy} / {good} / {hard})")]
    InvalidThresholds { easy: u64, good: u64, hard: u64 },

    #[error("context_window cannot be 0")]
    InvalidContextWindow,

    #[error("response_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("provider command cannot be empty")]
    EmptyCommand,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Rubric and reply-wait settings
    pub review: FileReviewConfig,
    /// External model command
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Review log settings
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let thresholds = self.review.thresholds();
        if thresholds.validate().is_err() {
            return Err(ConfigValidationError::InvalidThresholds {
                easy: thresholds.easy,
                good: thresholds.good,
                hard: thresholds.hard,
            });
        }

        if self.review.context_window == 0 {
            return Err(ConfigValidationError::InvalidContextWindow);
        }

        if self.review.response_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        // An unset command is fine until a gateway is needed; a blank one is a typo.
        if self.provider.command.is_some() && self.provider.command().is_none() {
            return Err(ConfigValidationError::EmptyCommand);
        }

        Ok(())
    }

    /// Review parameters for the application layer.
    ///
    /// Call [`validate`](Self::validate) first; this conversion does not check.
    pub fn to_params(&self) -> ReviewParams {
        ReviewParams::default()
            .with_thresholds(self.review.thresholds())
            .with_system_prompt(self.review.system_prompt())
            .with_language(self.review.language.clone())
            .with_context_window(self.review.context_window)
            .with_response_timeout(self.review.response_timeout())
    }
}
