//! Failures of a Gemini `generateContent` call.
//!
//! Gemini reports errors as `{"error": {"code", "message", "status"}}`; the
//! structured variants carry those fields as sent.

/// Error raised by the Gemini client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// The API key is missing, invalid or lacks permission (HTTP 401/403).
    #[error("Gemini rejected the API key ({status}): {message}")]
    Auth {
        /// Gemini status, e.g. `PERMISSION_DENIED`.
        status: String,
        /// Gemini's explanation.
        message: String,
    },

    /// Quota exhausted after every retry (HTTP 429).
    #[error("Gemini quota exceeded: {message}")]
    RateLimited {
        /// Gemini's explanation.
        message: String,
    },

    /// Any other structured Gemini error.
    #[error("Gemini error {code} {status}: {message}")]
    Api {
        /// HTTP status code.
        code: u16,
        /// Gemini status, e.g. `INVALID_ARGUMENT`.
        status: String,
        /// Gemini's explanation.
        message: String,
    },

    /// A non-success status whose body is not a Gemini error object.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A success response that does not hold a usable candidate.
    #[error("unexpected Gemini response: {0}")]
    InvalidResponse(String),

    /// The request exceeded the configured timeout.
    #[error("Gemini request timed out")]
    Timeout,

    /// The request could not be sent or the body could not be read.
    #[error("Gemini request failed: {0}")]
    Transport(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
