//! Model provider implementations.
//!
//! Currently a single backend: [`gemini`], talking to the Gemini
//! `generateContent` REST API.

mod error;
pub mod gemini;

pub use error::LlmError;
pub use gemini::{Gemini, GeminiConfig, RetryOptions};
