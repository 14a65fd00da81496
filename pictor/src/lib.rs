//! Pictor - an MCP-backed image agent
//!
//! This crate runs a Gemini agent that can call tools served by an MCP server
//! over stdio, then scans the events of the run for the first image the tools
//! returned and for the model's final text.

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llms;
pub mod mcp;
pub mod prelude;
pub mod scanner;
pub mod tool;

pub use error::{Error, Result};
