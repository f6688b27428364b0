//! Appspec LLM Provider Layer
//!
//! A single-method capability for chat completions, plus its implementations.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted replies for testing, no network
//! - `OpenAiProvider`: OpenAI-compatible `/chat/completions` endpoint
//!
//! # Examples
//!
//! ```
//! use appspec_llm::{ChatRequest, LlmProvider, MockProvider};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let reply = provider.complete(&ChatRequest::new("system", "user")).await.unwrap();
//! assert_eq!(reply, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use openai::{OpenAiConfig, OpenAiProvider};

/// Errors that can occur while calling an LLM provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// The call did not complete within the configured timeout
    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    /// The call was aborted before a reply arrived
    #[error("LLM request aborted")]
    Cancelled,

    /// Transport failure reaching the provider
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status
    #[error("LLM API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status returned by the provider
        status: u16,
        /// Error text returned by the provider
        message: String,
    },

    /// The provider envelope could not be decoded
    #[error("Invalid LLM API response: {0}")]
    InvalidResponse(String),

    /// Provider misconfiguration
    #[error("LLM configuration error: {0}")]
    Config(String),
}

/// One chat-completion call: a system prompt and a single user message
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Instructions for the model
    pub system_prompt: String,
    /// The user's message
    pub user_message: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in the reply
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    /// Default reply token budget
    pub const DEFAULT_MAX_TOKENS: u32 = 2000;

    /// Create a request with default sampling settings
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the reply token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Capability to turn a chat request into reply text
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue a single completion call and return the reply text
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies keyed by user message, without any network
/// calls. Every request is recorded so tests can inspect what was sent.
///
/// # Examples
///
/// ```
/// use appspec_llm::{ChatRequest, LlmError, LlmProvider, MockProvider};
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.add_error("prompt2", LlmError::Cancelled);
///
/// let ok = provider.complete(&ChatRequest::new("sys", "prompt1")).await;
/// assert_eq!(ok.unwrap(), "response1");
/// let err = provider.complete(&ChatRequest::new("sys", "prompt2")).await;
/// assert_eq!(err.unwrap_err(), LlmError::Cancelled);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: Result<String, LlmError>,
    replies: Arc<Mutex<HashMap<String, Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed reply for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Ok(response.into()))
    }

    /// Create a MockProvider that fails every request with `error`
    pub fn failing(error: LlmError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_reply: Result<String, LlmError>) -> Self {
        Self {
            default_reply,
            replies: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific reply for a given user message
    pub fn add_response(&mut self, user_message: impl Into<String>, response: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_message.into(), Ok(response.into()));
    }

    /// Fail requests carrying a given user message
    pub fn add_error(&mut self, user_message: impl Into<String>, error: LlmError) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_message.into(), Err(error));
    }

    /// Number of completion calls made so far
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        match replies.get(&request.user_message) {
            Some(reply) => reply.clone(),
            None => self.default_reply.clone(),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
