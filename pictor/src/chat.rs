//! Chat requests, responses and the [`ChatProvider`] trait.
//!
//! This is the seam between the agent runner and a model backend. The runner
//! only speaks in [`Content`] blocks; providers translate to their wire
//! format.

use std::ops::{Add, AddAssign};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::event::{Content, FunctionCall};
use crate::tool::ToolDefinition;

/// A single model invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gemini-2.5-flash-lite").
    pub model: String,
    /// System instruction, if any.
    pub system_instruction: Option<String>,
    /// Conversation history, oldest first.
    pub contents: Vec<Content>,
    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    /// Creates an empty request for a model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Sets the system instruction. Empty instructions are ignored.
    #[must_use]
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        self.system_instruction = (!instruction.is_empty()).then_some(instruction);
        self
    }

    /// Replaces the conversation history.
    #[must_use]
    pub fn contents(mut self, contents: Vec<Content>) -> Self {
        self.contents = contents;
        self
    }

    /// Sets the available tools.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    /// Tokens in the prompt.
    pub input_tokens: u32,
    /// Tokens generated.
    pub output_tokens: u32,
    /// Total tokens billed, which may include thinking tokens.
    pub total_tokens: u32,
}

impl Usage {
    /// Create a new usage record.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32, total_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input_tokens: self.input_tokens.saturating_add(rhs.input_tokens),
            output_tokens: self.output_tokens.saturating_add(rhs.output_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// The model's answer to a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatResponse {
    /// The generated content.
    pub content: Content,
    /// Why the model stopped, as reported by the provider.
    pub finish_reason: Option<String>,
    /// Token usage, when reported.
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Wrap generated content.
    #[must_use]
    pub const fn new(content: Content) -> Self {
        Self {
            content,
            finish_reason: None,
            usage: None,
        }
    }

    /// The concatenated text of the response.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Function calls requested by the model.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.content.function_calls()
    }
}

/// Trait for model backends that answer chat requests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a request and receive a complete response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Llm`](crate::Error::Llm) for provider failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Get the name of this provider.
    ///
    /// Used for error messages and logging.
    fn provider_name(&self) -> &'static str;
}

/// Type alias for an Arc-wrapped `ChatProvider`.
pub type SharedChatProvider = Arc<dyn ChatProvider>;
