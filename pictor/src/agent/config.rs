//! Agent definition.

use crate::chat::SharedChatProvider;
use crate::tool::{SharedToolset, ToolDefinition};

/// An LLM agent: a model, an instruction and the toolsets it may call.
///
/// The agent holds configuration only; [`Runner`](super::Runner) executes it.
///
/// ```rust,ignore
/// let agent = Agent::new("image_agent")
///     .model("gemini-2.5-flash-lite")
///     .instruction("Use the getTinyImage tool ...")
///     .provider(Arc::new(gemini))
///     .toolset(Arc::new(mcp_toolset));
/// ```
#[derive(Clone)]
pub struct Agent {
    /// Agent name, used as the author of every event it emits.
    pub name: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// System instruction.
    pub instruction: String,
    /// The model backend.
    pub provider: Option<SharedChatProvider>,
    /// Toolsets whose tools the model may call.
    pub toolsets: Vec<SharedToolset>,
    /// Upper bound on model calls per run.
    pub max_steps: usize,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("instruction", &self.instruction)
            .field(
                "provider",
                &self.provider.as_ref().map(|p| p.provider_name()),
            )
            .field("toolsets", &self.toolsets.len())
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

impl Agent {
    /// Default step limit.
    pub const DEFAULT_MAX_STEPS: usize = 10;

    /// Creates an agent with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: String::new(),
            instruction: String::new(),
            provider: None,
            toolsets: Vec::new(),
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the system instruction.
    #[must_use]
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Sets the model backend.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Attaches a toolset.
    #[must_use]
    pub fn toolset(mut self, toolset: SharedToolset) -> Self {
        self.toolsets.push(toolset);
        self
    }

    /// Sets the step limit.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Definitions of every tool across all toolsets.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.toolsets
            .iter()
            .flat_map(|toolset| toolset.definitions())
            .collect()
    }

    /// The first toolset exposing a tool with this name.
    #[must_use]
    pub fn find_toolset(&self, name: &str) -> Option<&SharedToolset> {
        self.toolsets.iter().find(|toolset| toolset.contains(name))
    }
}
