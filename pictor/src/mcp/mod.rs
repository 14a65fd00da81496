//! Model Context Protocol (MCP) tool connector.
//!
//! A [`StdioConnection`] describes how to launch an MCP server as a
//! subprocess and which tools to expose. [`McpToolset::connect`] spawns it,
//! performs the handshake through `rmcp`, and serves the filtered tools to an
//! [`Agent`](crate::agent::Agent) via the [`Toolset`](crate::tool::Toolset)
//! trait.
//!
//! ```rust,ignore
//! use pictor::mcp::{McpToolset, StdioConnection};
//!
//! let toolset = McpToolset::connect(
//!     StdioConnection::new("npx")
//!         .args(["-y", "@modelcontextprotocol/server-everything"])
//!         .tool_filter(["getTinyImage"])
//!         .timeout_secs(30),
//! )
//! .await?;
//! ```

mod client;
mod config;
mod error;

pub use client::McpToolset;
pub use config::StdioConnection;
pub use error::McpError;
