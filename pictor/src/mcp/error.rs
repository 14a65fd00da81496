//! Error type for MCP operations.

use std::time::Duration;

/// Errors raised while talking to an MCP server.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum McpError {
    /// The server process could not be started or failed the handshake.
    #[error("failed to start MCP server `{command}`: {message}")]
    ProcessSpawnFailed {
        /// The launch command.
        command: String,
        /// Underlying error description.
        message: String,
    },

    /// An operation did not finish within the connection timeout.
    #[error("MCP {operation} timed out after {}s", timeout.as_secs_f64())]
    Timeout {
        /// What was being attempted.
        operation: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// Listing the server's tools failed.
    #[error("failed to list tools: {0}")]
    ListToolsFailed(String),

    /// The tool is filtered out or unknown to this toolset.
    #[error("tool `{0}` is not available on this MCP server")]
    ToolNotAllowed(String),

    /// The server rejected or failed a tool call.
    #[error("tool `{name}` failed: {message}")]
    CallFailed {
        /// Tool name.
        name: String,
        /// Underlying error description.
        message: String,
    },

    /// The stdio transport failed while shutting down.
    #[error("transport shutdown failed: {0}")]
    Shutdown(String),
}

impl McpError {
    /// Create a timeout error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }
}
