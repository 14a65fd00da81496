//! Gemini [`ChatProvider`] implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::Result;
use crate::event::Role;
use crate::llms::LlmError;

use super::config::GeminiConfig;
use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

const PROVIDER: &str = "gemini";

/// Gemini API client.
///
/// # Example
///
/// ```rust,ignore
/// use pictor::llms::{Gemini, GeminiConfig};
///
/// let gemini = Gemini::new(GeminiConfig::new(api_key))?;
/// let agent = Agent::new("image_agent").provider(Arc::new(gemini));
/// ```
#[derive(Clone)]
pub struct Gemini {
    http: reqwest::Client,
    config: Arc<GeminiConfig>,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Gemini {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send the request, retrying statuses listed in the retry policy.
    async fn send_with_retry(
        &self,
        url: &str,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response> {
        let retry = &self.config.retry;
        let attempts = retry.attempts.max(1);
        let mut attempt = 1;

        loop {
            let response = self
                .http
                .post(url)
                .header("x-goog-api-key", self.config.api_key.as_str())
                .json(body)
                .send()
                .await
                .map_err(LlmError::from)?;

            let status = response.status().as_u16();
            if attempt >= attempts || !retry.should_retry(status) {
                return Ok(response);
            }

            let delay = retry.delay_for(attempt);
            warn!(status, attempt, attempts, delay = ?delay, "Gemini request failed, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Map a non-success response into an [`LlmError`].
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) else {
            return LlmError::HttpStatus {
                status,
                body: body.to_owned(),
            };
        };

        let gemini_status = error.status.unwrap_or_default();
        match status {
            401 | 403 => LlmError::Auth {
                status: gemini_status,
                message: error.message,
            },
            429 => LlmError::RateLimited {
                message: error.message,
            },
            _ => LlmError::Api {
                code: status,
                status: gemini_status,
                message: error.message,
            },
        }
    }

    /// Convert a parsed response into a [`ChatResponse`].
    pub(crate) fn parse_response(response: GenerateContentResponse) -> Result<ChatResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no candidates".to_owned()))?;

        let mut content = candidate.content.unwrap_or_default();
        content.role = Role::Model;

        Ok(ChatResponse {
            content,
            finish_reason: candidate.finish_reason,
            usage: response.usage_metadata.map(Into::into),
        })
    }
}

#[async_trait]
impl ChatProvider for Gemini {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let model = if request.model.is_empty() {
            self.config.model.as_str()
        } else {
            request.model.as_str()
        };
        let url = self.generate_url(model);
        let body = GenerateContentRequest::from_chat(request);

        debug!(model, contents = body.contents.len(), "Sending Gemini request");
        let response = self.send_with_retry(&url, &body).await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(LlmError::from)?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                LlmError::InvalidResponse(format!("{e}, response: {response_text}"))
            })?;

        Self::parse_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
