//! Presentation layer for answer-checker
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{
    AskArgs, CardArgs, Cli, ClozeArgs, Command, EvaluateArgs, ExtractArgs, OutputFormat,
    PromptArgs,
};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
