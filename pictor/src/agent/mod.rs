//! Agent module: the agent definition and its execution loop.
//!
//! - **[`Agent`]** bundles a model, an instruction, a provider and toolsets.
//! - **[`Runner`]** is a stateless engine that drives the agent until the
//!   model answers without calling a tool, returning every [`Event`] emitted.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pictor::agent::{Agent, Runner};
//!
//! let agent = Agent::new("image_agent")
//!     .model("gemini-2.5-flash-lite")
//!     .instruction("Use the getTinyImage tool.")
//!     .provider(gemini.clone())
//!     .toolset(mcp.clone());
//!
//! let events = Runner::run(&agent, "Provide a sample tiny image").await?;
//! ```
//!
//! [`Event`]: crate::event::Event

mod config;
mod runner;

pub use config::Agent;
pub use runner::Runner;
