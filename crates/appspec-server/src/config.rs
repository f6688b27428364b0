//! Configuration for the server.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables (a `.env` file is honored by the binary).

use appspec_extractor::ExtractorConfig;
use appspec_llm::openai::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use appspec_llm::OpenAiConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An environment variable holds an unusable value
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// Settings are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 3001)
    pub bind_port: u16,

    /// SQLite path for the failure log; unset disables failure logging
    pub database_path: Option<String>,

    /// LLM provider settings
    pub llm: LlmSettings,

    /// Extraction settings
    pub extractor: ExtractorConfig,
}

/// LLM provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key; unset or blank selects template mode
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 3001,
            database_path: None,
            llm: LlmSettings::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// | Variable | Setting |
    /// |---|---|
    /// | `APPSPEC_BIND_ADDRESS` | `bind_address` |
    /// | `PORT` | `bind_port` |
    /// | `DATABASE_URL` | `database_path` |
    /// | `LLM_API_KEY` | `llm.api_key` |
    /// | `LLM_BASE_URL` | `llm.base_url` |
    /// | `LLM_MODEL` | `llm.model` |
    /// | `LLM_TIMEOUT_SECS` | `llm.timeout_secs` |
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("APPSPEC_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(port) = lookup("PORT") {
            self.bind_port = parse_var("PORT", port)?;
        }
        if let Some(path) = lookup("DATABASE_URL") {
            self.database_path = Some(path);
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(secs) = lookup("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_var("LLM_TIMEOUT_SECS", secs)?;
        }
        Ok(self)
    }

    /// Check settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        self.extractor_config()
            .validate()
            .map_err(ConfigError::Invalid)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// API key, if one is set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Provider settings, or `None` for template mode
    pub fn openai_config(&self) -> Option<OpenAiConfig> {
        self.api_key().map(|key| {
            OpenAiConfig::new(key, self.llm.model.clone())
                .with_base_url(self.llm.base_url.clone())
                .with_timeout_secs(self.llm.timeout_secs)
        })
    }

    /// Extraction settings, with the provider call bounded by `llm.timeout_secs`
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            request_timeout_secs: self.llm.timeout_secs,
            ..self.extractor.clone()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::InvalidValue { key, value }),
    }
}
