//! Infrastructure layer for answer-checker
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, card content
//! extraction, the subprocess LLM gateway and the JSONL review log.

pub mod card;
pub mod config;
pub mod gateway;
pub mod logging;

// Re-export commonly used types
pub use card::{AnkiCard, AnkiCardExtractor, JsonFileCardSource, StaticCardSource};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileInputFormat, FileLogConfig,
    FileOutputConfig, FileOutputFormat, FileProviderConfig, FileReviewConfig,
};
pub use gateway::{CommandGatewayError, CommandLlmGateway};
pub use logging::JsonlReviewLogger;
