//! Configuration for the Extractor

use appspec_llm::ChatRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters, after trimming)
    pub max_text_length: usize,

    /// Sampling temperature for the provider call
    pub temperature: f32,

    /// Token budget for the provider reply
    pub max_tokens: u32,

    /// Maximum time for a single provider call (seconds)
    pub request_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the provider call timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: crate::input::MAX_TEXT_CHARS,
            temperature: ChatRequest::DEFAULT_TEMPERATURE,
            max_tokens: ChatRequest::DEFAULT_MAX_TOKENS,
            request_timeout_secs: 30,
        }
    }
}
