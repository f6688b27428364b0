//! Error source module - diagnostic categories for failed generations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a failure is filed under in the failure log
///
/// Categories are advisory. They never influence the status code or the
/// message returned to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    /// Caller input was rejected
    Validation,

    /// The provider call timed out or was cancelled
    Timeout,

    /// The provider reply could not be parsed
    Parsing,

    /// The provider API rejected or mangled the call
    LlmApi,

    /// Transport-level failure reaching the provider
    Network,

    /// Anything else
    Unknown,
}

impl ErrorSource {
    /// All categories, in classification-rule order
    pub const ALL: [ErrorSource; 6] = [
        ErrorSource::Validation,
        ErrorSource::Timeout,
        ErrorSource::Parsing,
        ErrorSource::LlmApi,
        ErrorSource::Network,
        ErrorSource::Unknown,
    ];

    /// Get the storage/wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSource::Validation => "validation",
            ErrorSource::Timeout => "timeout",
            ErrorSource::Parsing => "parsing",
            ErrorSource::LlmApi => "llm_api",
            ErrorSource::Network => "network",
            ErrorSource::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorSource::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("Unknown error source: {}", s))
    }
}
