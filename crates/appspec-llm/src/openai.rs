//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint implementing the OpenAI `/chat/completions` API
//! (OpenAI itself, OpenRouter, local gateways).
//!
//! # Features
//!
//! - Async HTTP communication with bearer-token auth
//! - Configurable endpoint, model and timeout
//! - One call per request; failures are reported, never retried
//!
//! # Examples
//!
//! ```no_run
//! use appspec_llm::{OpenAiConfig, OpenAiProvider};
//!
//! let config = OpenAiConfig::new("sk-test", "gpt-4o-mini");
//! let provider = OpenAiProvider::new(config).unwrap();
//! ```

use crate::{ChatRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest provider error body kept in an [`LlmError::Api`] message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Settings with the default base URL and timeout
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI-compatible chat-completion provider
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiProvider {
    /// Create a provider from connection settings
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the API key or model is blank, or the
    /// HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(LlmError::Config("model is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("POST {} (model {})", self.endpoint(), self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        extract_content(&text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Pull the first choice's message content out of a completion envelope
///
/// A reply with no choices or no content yields an empty string; deciding
/// whether that is an error is up to the caller.
fn extract_content(body: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to decode completion: {}", e)))?;

    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}

/// Best-effort readable message from a provider error body
fn api_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no error body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
