//! Launch parameters for a stdio MCP server.

use std::time::Duration;

/// Describes how to launch an MCP server as a subprocess and which of its
/// tools to expose.
///
/// This is plain configuration: spawning, the handshake and the process
/// lifetime are handled by [`McpToolset`](super::McpToolset).
///
/// # Example
///
/// ```rust,ignore
/// let connection = StdioConnection::new("npx")
///     .args(["-y", "@modelcontextprotocol/server-everything"])
///     .tool_filter(["getTinyImage"])
///     .timeout_secs(30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioConnection {
    command: String,
    args: Vec<String>,
    tool_filter: Vec<String>,
    timeout: Duration,
}

impl StdioConnection {
    /// Default connection timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// Creates a connection for the given launch command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            tool_filter: Vec::new(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the ordered launch arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the exposed tools to these names. Empty exposes all tools.
    #[must_use]
    pub fn tool_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_filter = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    /// The launch command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The launch arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The tool allow-list.
    #[must_use]
    pub fn filter(&self) -> &[String] {
        &self.tool_filter
    }

    /// The connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a tool with this name passes the filter.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.tool_filter.is_empty() || self.tool_filter.iter().any(|allowed| allowed == name)
    }
}
