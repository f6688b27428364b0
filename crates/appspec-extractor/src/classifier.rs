//! Error source classification for the failure log
//!
//! A fixed, ordered list of checks over an error's status, message and abort
//! flag. The order matters: a message mentioning both "JSON" and "API" is a
//! parsing failure. Labels are diagnostic only.

use crate::error::ExtractorError;
use appspec_domain::ErrorSource;
use appspec_llm::LlmError;

/// Markers that show a host name could not be resolved
const DNS_FAILURE_MARKERS: [&str; 2] = ["ENOTFOUND", "dns error"];

/// What the classifier needs to know about an error
pub trait ErrorFacts {
    /// HTTP-equivalent status, if the error carries one
    fn status(&self) -> Option<u16>;

    /// Human-readable message
    fn message(&self) -> String;

    /// Whether the operation was aborted or cancelled
    fn is_abort(&self) -> bool;
}

impl ErrorFacts for ExtractorError {
    /// Provider errors report the provider's own status when they carry one
    fn status(&self) -> Option<u16> {
        match self {
            ExtractorError::Provider(inner) => inner.status().or(Some(self.status_code())),
            _ => Some(self.status_code()),
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn is_abort(&self) -> bool {
        matches!(self, ExtractorError::Provider(LlmError::Cancelled))
    }
}

impl ErrorFacts for LlmError {
    fn status(&self) -> Option<u16> {
        match self {
            LlmError::Timeout(_) => Some(504),
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn is_abort(&self) -> bool {
        matches!(self, LlmError::Cancelled)
    }
}

/// Assign an [`ErrorSource`] to an error
///
/// # Examples
///
/// ```
/// use appspec_domain::ErrorSource;
/// use appspec_extractor::{classify, ExtractorError};
///
/// let err = ExtractorError::Parsing("expected value at line 1".into());
/// assert_eq!(classify(&err), ErrorSource::Parsing);
/// ```
pub fn classify<E: ErrorFacts + ?Sized>(error: &E) -> ErrorSource {
    let status = error.status();
    let message = error.message();

    if status == Some(400) {
        ErrorSource::Validation
    } else if status == Some(504) {
        ErrorSource::Timeout
    } else if message.contains("JSON") {
        ErrorSource::Parsing
    } else if message.contains("API") {
        ErrorSource::LlmApi
    } else if message.contains("network") || message.contains("fetch") {
        ErrorSource::Network
    } else if error.is_abort() {
        ErrorSource::Timeout
    } else if message.contains("network")
        || DNS_FAILURE_MARKERS.iter().any(|m| message.contains(m))
    {
        ErrorSource::Network
    } else {
        ErrorSource::Unknown
    }
}

/// An error paired with its classification
#[derive(Debug)]
pub struct ClassifiedError<'a> {
    /// The original error
    pub error: &'a ExtractorError,
    /// Category assigned by [`classify`]
    pub source: ErrorSource,
}

impl<'a> ClassifiedError<'a> {
    /// Classify `error`
    pub fn new(error: &'a ExtractorError) -> Self {
        Self {
            error,
            source: classify(error),
        }
    }
}
