//! Google Gemini provider.
//!
//! Talks to the `generateContent` REST endpoint with `reqwest`, retrying
//! transient HTTP statuses according to [`RetryOptions`].

mod client;
mod config;
mod types;

pub use client::Gemini;
pub use config::{GeminiConfig, RetryOptions};
