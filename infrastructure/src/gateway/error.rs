//! Error types for the command gateway

use checker_application::GatewayError;
use thiserror::Error;

/// Errors that can occur when running the provider command
#[derive(Error, Debug)]
pub enum CommandGatewayError {
    #[error("No provider command configured")]
    NoCommand,

    #[error("Failed to spawn provider command '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture {0} of provider command")]
    PipeUnavailable(&'static str),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error while talking to provider command: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider command exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },
}

impl From<CommandGatewayError> for GatewayError {
    fn from(err: CommandGatewayError) -> Self {
        match err {
            CommandGatewayError::NoCommand | CommandGatewayError::SpawnError { .. } => {
                GatewayError::ConnectionError(err.to_string())
            }
            CommandGatewayError::PipeUnavailable(_) | CommandGatewayError::Io(_) => {
                GatewayError::TransportClosed
            }
            CommandGatewayError::SerializationError(_) => GatewayError::Other(err.to_string()),
            CommandGatewayError::Exited { .. } => GatewayError::RequestFailed(err.to_string()),
        }
    }
}
