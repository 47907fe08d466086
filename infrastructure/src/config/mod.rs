//! Configuration file loading for answer-checker
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ANSWER_CHECKER_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./answer-checker.toml` or `./.answer-checker.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/answer-checker/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileInputFormat, FileLogConfig, FileOutputConfig,
    FileOutputFormat, FileProviderConfig, FileReviewConfig,
};
pub use loader::ConfigLoader;
