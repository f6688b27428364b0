//! Failure module - diagnostic records for failed generation attempts

use crate::ErrorSource;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum characters of user input kept in a failure record
pub const MAX_USER_INPUT_CHARS: usize = 10_000;

/// Maximum characters of error message kept in a failure record
pub const MAX_ERROR_MESSAGE_CHARS: usize = 1_000;

/// Unique identifier for a failure record based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time, which matches how the
/// failure log is read back (most recent first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FailureId(u128);

impl FailureId {
    /// Generate a new UUIDv7-based FailureId
    ///
    /// # Examples
    ///
    /// ```
    /// use appspec_domain::FailureId;
    ///
    /// let id = FailureId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a FailureId from a raw u128 value (storage layer)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a FailureId from its hyphenated string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid failure id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for FailureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FailureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for FailureId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FailureId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FailureId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// A diagnostic entry describing one failed generation attempt
///
/// Records are write-once: nothing in the system updates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Unique identifier
    pub id: FailureId,

    /// Creation time (milliseconds since Unix epoch)
    pub timestamp: u64,

    /// The text the caller submitted (truncated)
    pub user_input: String,

    /// Classified category of the failure
    pub error_source: ErrorSource,

    /// Internal error message (truncated)
    pub error_message: String,

    /// Raw provider output, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl FailureRecord {
    /// Build a record stamped with the current time
    ///
    /// `user_input` and `error_message` are truncated to
    /// [`MAX_USER_INPUT_CHARS`] and [`MAX_ERROR_MESSAGE_CHARS`].
    ///
    /// # Examples
    ///
    /// ```
    /// use appspec_domain::{ErrorSource, FailureRecord};
    ///
    /// let record = FailureRecord::new("build me an app", ErrorSource::Network, "network down", None);
    /// assert_eq!(record.error_source, ErrorSource::Network);
    /// assert!(record.raw_response.is_none());
    /// ```
    pub fn new(
        user_input: &str,
        error_source: ErrorSource,
        error_message: &str,
        raw_response: Option<String>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            id: FailureId::new(),
            timestamp,
            user_input: truncate_chars(user_input, MAX_USER_INPUT_CHARS).to_string(),
            error_source,
            error_message: truncate_chars(error_message, MAX_ERROR_MESSAGE_CHARS).to_string(),
            raw_response,
        }
    }
}

/// Return at most `max_chars` characters of `s`, never splitting a character
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
