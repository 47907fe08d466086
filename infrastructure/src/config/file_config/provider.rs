//! Provider configuration from TOML (`[provider]` section)
//!
//! The provider is an external command that reads a prompt on stdin and
//! writes the model's reply on stdout.
//!
//! ```toml
//! [provider]
//! command = "llm"
//! args = ["-m", "gpt-4o-mini"]
//! model = "gpt-4o-mini"
//! input = "json"
//! ```

use serde::{Deserialize, Serialize};

/// How the prompt pair is written to the provider's stdin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileInputFormat {
    /// System message, a blank line, then the user message
    #[default]
    Text,
    /// A single JSON object with `system`, `user` and `model` keys
    Json,
}

/// Raw provider configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Program to spawn for each request
    pub command: Option<String>,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Model name, informational (logged and passed in JSON input)
    pub model: Option<String>,
    /// Stdin format
    pub input: FileInputFormat,
}

impl FileProviderConfig {
    /// The configured command, if it is non-blank.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}
