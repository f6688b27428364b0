//! Error types for the Extractor

use appspec_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while generating requirements
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Caller input was rejected
    #[error("{0}")]
    Validation(String),

    /// Provider returned no text
    #[error("Empty response from LLM API")]
    EmptyResponse,

    /// Provider text is not valid JSON
    #[error("Failed to parse LLM response as JSON: {0}")]
    Parsing(String),

    /// Provider JSON does not have the expected shape
    #[error("{0}")]
    Structure(String),

    /// The provider call itself failed
    #[error(transparent)]
    Provider(#[from] LlmError),
}

impl ExtractorError {
    /// HTTP-equivalent status for this error
    ///
    /// Timeouts carry 504 internally; the HTTP layer reports every non-400
    /// status as 500.
    pub fn status_code(&self) -> u16 {
        match self {
            ExtractorError::Validation(_) => 400,
            ExtractorError::Provider(LlmError::Timeout(_)) => 504,
            _ => 500,
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() == 400
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::Parsing(e.to_string())
    }
}
