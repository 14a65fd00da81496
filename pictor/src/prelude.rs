//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use pictor::prelude::*;
//! ```

pub use crate::agent::{Agent, Runner};
pub use crate::chat::{ChatProvider, ChatRequest, ChatResponse, SharedChatProvider, Usage};
pub use crate::config::{AgentConfig, AppConfig, ConfigError, McpConfig, ModelConfig};
pub use crate::error::{Error, Result};
pub use crate::event::{
    Content, Event, FunctionCall, FunctionResponse, Part, ResponseItem, Role, ToolResponse,
};
pub use crate::llms::{Gemini, GeminiConfig, LlmError, RetryOptions};
pub use crate::mcp::{McpError, McpToolset, StdioConnection};
pub use crate::scanner::{ImageStatus, extract_image, extract_image_default, extract_text};
pub use crate::tool::{SharedToolset, ToolDefinition, Toolset};
