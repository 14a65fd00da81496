//! Unified error types for pictor.
//!
//! Library operations propagate these with `?` and never recover locally.
//! Only the binary's entry point decides which errors are fatal, using
//! [`Error::is_transport_shutdown`] to recognize the benign failure that can
//! occur while tearing down the MCP subprocess.

use crate::config::ConfigError;
use crate::llms::LlmError;
use crate::mcp::McpError;

/// Result type alias for pictor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// MCP connection or tool error.
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Agent runtime error.
    #[error("Agent error: {0}")]
    Agent(String),

    /// Maximum steps reached during agent execution.
    #[error("Maximum steps ({max_steps}) reached without final answer")]
    MaxSteps {
        /// The maximum number of steps configured.
        max_steps: usize,
    },

    /// An image payload was not valid base64.
    #[error("Image decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an agent error with a message.
    #[must_use]
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create a max steps error.
    #[must_use]
    pub const fn max_steps(max_steps: usize) -> Self {
        Self::MaxSteps { max_steps }
    }

    /// Whether this is the known failure raised while stopping the MCP
    /// stdio transport after a run has finished.
    #[must_use]
    pub const fn is_transport_shutdown(&self) -> bool {
        matches!(self, Self::Mcp(McpError::Shutdown(_)))
    }
}
