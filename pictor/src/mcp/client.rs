use std::time::Duration;

use async_trait::async_trait;
use rmcp::{
    RoleClient, ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, Implementation,
        InitializeRequestParams, Tool,
    },
    service::{RunningService, ServerSink},
    transport::child_process::TokioChildProcess,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::config::StdioConnection;
use super::error::McpError;
use crate::error::Result;
use crate::event::ToolResponse;
use crate::tool::{ToolDefinition, Toolset};

/// Client name sent to the server during the handshake.
const CLIENT_NAME: &str = "pictor";

type ClientService = RunningService<RoleClient, InitializeRequestParams>;

/// The filtered tools of one MCP server running as a local subprocess.
///
/// Created by [`McpToolset::connect`]. The subprocess lives until
/// [`McpToolset::shutdown`] is called or the toolset is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let toolset = McpToolset::connect(
///     StdioConnection::new("npx")
///         .args(["-y", "@modelcontextprotocol/server-everything"])
///         .tool_filter(["getTinyImage"])
///         .timeout_secs(30),
/// )
/// .await?;
/// println!("Tools: {:?}", toolset.tool_names());
/// ```
pub struct McpToolset {
    command: String,
    sink: ServerSink,
    tools: Vec<Tool>,
    timeout: Duration,
    service: Mutex<Option<ClientService>>,
}

impl std::fmt::Debug for McpToolset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolset")
            .field("command", &self.command)
            .field("tools", &self.tool_names())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl McpToolset {
    /// Spawns the server, performs the handshake and lists its tools.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::ProcessSpawnFailed`] if the process cannot start or
    /// the handshake fails, [`McpError::Timeout`] if the server does not answer
    /// within the connection timeout, and [`McpError::ListToolsFailed`] if the
    /// tool listing fails.
    pub async fn connect(connection: StdioConnection) -> std::result::Result<Self, McpError> {
        let init = InitializeRequestParams {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: CLIENT_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Default::default()
            },
        };

        let command = connection.command().to_owned();
        let timeout = connection.connect_timeout();

        let mut cmd = tokio::process::Command::new(&command);
        cmd.args(connection.arguments());

        let transport = TokioChildProcess::new(cmd).map_err(|e| McpError::ProcessSpawnFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

        let service = tokio::time::timeout(timeout, init.serve(transport))
            .await
            .map_err(|_| McpError::timeout("initialize", timeout))?
            .map_err(|e| McpError::ProcessSpawnFailed {
                command: command.clone(),
                message: e.to_string(),
            })?;

        let listed = tokio::time::timeout(timeout, service.peer().list_tools(Default::default()))
            .await
            .map_err(|_| McpError::timeout("tools/list", timeout))?
            .map_err(|e| McpError::ListToolsFailed(e.to_string()))?
            .tools;

        let (tools, skipped): (Vec<Tool>, Vec<Tool>) = listed
            .into_iter()
            .partition(|tool| connection.allows(&tool.name));

        if !skipped.is_empty() {
            debug!(
                command = %command,
                skipped = ?skipped.iter().map(|t| t.name.as_ref()).collect::<Vec<&str>>(),
                "Tools excluded by filter",
            );
        }
        if tools.is_empty() {
            warn!(command = %command, filter = ?connection.filter(), "No MCP tools passed the filter");
        }

        let sink = service.peer().clone();
        let toolset = Self {
            command,
            sink,
            tools,
            timeout,
            service: Mutex::new(Some(service)),
        };
        info!(command = %toolset.command, tools = ?toolset.tool_names(), "Connected to MCP server");

        Ok(toolset)
    }

    /// Returns the filtered tool names.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_ref()).collect()
    }

    /// Stops the server and its transport.
    ///
    /// Calling this more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Shutdown`] if the transport task fails while
    /// stopping. The run itself has completed by then.
    pub async fn shutdown(&self) -> std::result::Result<(), McpError> {
        let Some(service) = self.service.lock().await.take() else {
            return Ok(());
        };

        service
            .cancel()
            .await
            .map_err(|e| McpError::Shutdown(e.to_string()))?;
        debug!(command = %self.command, "MCP server stopped");
        Ok(())
    }
}

fn definition(tool: &Tool) -> ToolDefinition {
    ToolDefinition::new(
        tool.name.as_ref(),
        tool.description.as_deref().unwrap_or_default(),
        Value::Object((*tool.input_schema).clone()),
    )
}

/// Reject names that did not pass the tool filter.
fn ensure_listed(tools: &[Tool], name: &str) -> std::result::Result<(), McpError> {
    if tools.iter().any(|t| t.name == name) {
        Ok(())
    } else {
        Err(McpError::ToolNotAllowed(name.to_owned()))
    }
}

/// Build the `tools/call` parameters. Non-object arguments are sent as none.
fn call_params(name: &str, args: Value) -> Result<CallToolRequestParams> {
    let arguments = match args {
        Value::Object(map) => Some(map),
        _ => None,
    };
    Ok(serde_json::from_value(
        json!({ "name": name, "arguments": arguments }),
    )?)
}

/// Convert an MCP call result into the crate's tool response.
fn tool_response(result: &CallToolResult) -> Result<ToolResponse> {
    Ok(serde_json::from_value(serde_json::to_value(result)?)?)
}

#[async_trait]
impl Toolset for McpToolset {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(definition).collect()
    }

    fn contains(&self, name: &str) -> bool {
        ensure_listed(&self.tools, name).is_ok()
    }

    async fn call(&self, name: &str, args: Value) -> Result<ToolResponse> {
        ensure_listed(&self.tools, name)?;
        let params = call_params(name, args)?;

        let result = tokio::time::timeout(self.timeout, self.sink.call_tool(params))
            .await
            .map_err(|_| McpError::timeout(format!("tools/call `{name}`"), self.timeout))?
            .map_err(|e| McpError::CallFailed {
                name: name.to_owned(),
                message: e.to_string(),
            })?;

        let response = tool_response(&result)?;
        debug!(
            tool = name,
            items = response.content.len(),
            is_error = response.is_error,
            "MCP tool returned",
        );
        Ok(response)
    }
}
