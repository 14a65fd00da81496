//! Application configuration.
//!
//! Settings come from built-in defaults, optionally overridden by a TOML file
//! named in the `PICTOR_CONFIG` environment variable. Every section is
//! optional; a missing file is not an error.
//!
//! ```toml
//! output = "tiny_image.png"
//!
//! [model]
//! name = "gemini-2.5-flash-lite"
//!
//! [model.retry]
//! attempts = 5
//!
//! [mcp]
//! command = "npx"
//! args = ["-y", "@modelcontextprotocol/server-everything"]
//! tool_filter = ["getTinyImage"]
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::llms::{GeminiConfig, RetryOptions};
use crate::mcp::StdioConnection;
use crate::scanner::DEFAULT_IMAGE_FILENAME;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PICTOR_CONFIG";

/// Instruction given to the image agent.
pub const DEFAULT_INSTRUCTION: &str = "Use the getTinyImage tool from the MCP Toolset to generate a small image for user queries. \
When providing the final response, clearly indicate that the image is a small, sample image.";

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where the extracted image is written.
    pub output: PathBuf,
    /// Model settings.
    pub model: ModelConfig,
    /// Agent settings.
    pub agent: AgentConfig,
    /// MCP server settings.
    pub mcp: McpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_IMAGE_FILENAME),
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
            mcp: McpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by [`CONFIG_ENV`], or use defaults when the
    /// variable is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(PathBuf::from(path)).await,
            None => {
                debug!(env = CONFIG_ENV, "no config file configured, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config file");

        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad setting.
    pub fn validate(&self) -> ConfigResult<()> {
        self.model
            .retry
            .validate()
            .map_err(|message| ConfigError::InvalidValue(format!("model.retry.{message}")))?;
        if self.model.timeout_secs == 0 {
            return Err(invalid("model.timeout_secs must be greater than 0"));
        }
        if self.agent.max_steps == 0 {
            return Err(invalid("agent.max_steps must be at least 1"));
        }
        if self.mcp.command.trim().is_empty() {
            return Err(invalid("mcp.command must not be empty"));
        }
        if self.mcp.timeout_secs == 0 {
            return Err(invalid("mcp.timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidValue(message.to_owned())
}

/// Gemini model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Model identifier.
    pub name: String,
    /// API base URL.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry policy for transient HTTP failures.
    pub retry: RetryOptions,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: GeminiConfig::DEFAULT_MODEL.to_owned(),
            base_url: GeminiConfig::DEFAULT_BASE_URL.to_owned(),
            api_key_env: "GOOGLE_API_KEY".to_owned(),
            timeout_secs: 120,
            retry: RetryOptions::default(),
        }
    }
}

impl ModelConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the variable is unset or empty.
    pub fn api_key(&self) -> ConfigResult<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingField(format!(
                    "{} (Gemini API key environment variable)",
                    self.api_key_env
                ))
            })
    }

    /// Build the Gemini client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the API key is not set.
    pub fn gemini_config(&self) -> ConfigResult<GeminiConfig> {
        Ok(GeminiConfig::new(self.api_key()?)
            .with_base_url(&self.base_url)
            .with_model(&self.name)
            .with_timeout(self.timeout_secs)
            .with_retry(self.retry.clone()))
    }
}

/// Agent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Agent name.
    pub name: String,
    /// System instruction.
    pub instruction: String,
    /// Upper bound on model calls.
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "image_agent".to_owned(),
            instruction: DEFAULT_INSTRUCTION.to_owned(),
            max_steps: 10,
        }
    }
}

/// MCP server launch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McpConfig {
    /// Launch command.
    pub command: String,
    /// Launch arguments.
    pub args: Vec<String>,
    /// Tools to expose. Empty exposes every tool.
    pub tool_filter: Vec<String>,
    /// Handshake and call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_owned(),
            args: vec![
                "-y".to_owned(),
                "@modelcontextprotocol/server-everything".to_owned(),
            ],
            tool_filter: vec!["getTinyImage".to_owned()],
            timeout_secs: 30,
        }
    }
}

impl McpConfig {
    /// Build the stdio connection parameters.
    #[must_use]
    pub fn connection(&self) -> StdioConnection {
        StdioConnection::new(&self.command)
            .args(&self.args)
            .tool_filter(&self.tool_filter)
            .timeout(Duration::from_secs(self.timeout_secs))
    }
}
