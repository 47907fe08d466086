//! Subprocess LLM gateway.
//!
//! [`CommandLlmGateway`] implements the
//! [`LlmGateway`](checker_application::LlmGateway) port by running a
//! configured provider command once per request.

mod command;
mod error;

pub use command::CommandLlmGateway;
pub use error::CommandGatewayError;
