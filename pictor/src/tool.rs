//! Tool definitions and the [`Toolset`] seam the runner dispatches through.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::event::ToolResponse;

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// What the tool does.
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the arguments.
    #[serde(default)]
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Get the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A group of tools served by one backend.
#[async_trait]
pub trait Toolset: Send + Sync {
    /// Definitions of every tool this set exposes.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Whether this set exposes a tool with the given name.
    fn contains(&self, name: &str) -> bool {
        self.definitions().iter().any(|def| def.name == name)
    }

    /// Invoke a tool with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or the backend fails.
    async fn call(&self, name: &str, args: Value) -> Result<ToolResponse>;
}

/// Type alias for an Arc-wrapped toolset.
pub type SharedToolset = Arc<dyn Toolset>;
