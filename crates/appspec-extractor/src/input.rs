//! Request payload checks, run before any provider call

use crate::error::ExtractorError;
use appspec_domain::GenerationRequest;
use serde_json::Value;

/// Maximum description length (characters, after trimming)
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Words that mark a short description as being about an application
const APP_KEYWORDS: &[&str] = &[
    "app",
    "application",
    "system",
    "platform",
    "tool",
    "website",
    "site",
    "service",
    "portal",
    "dashboard",
    "manage",
    "management",
    "track",
    "tracker",
    "build",
    "store",
    "shop",
];

/// Below this many words a description is always too simple
const MIN_WORDS: usize = 3;

/// Below this many words a description needs an application keyword
const MIN_WORDS_WITHOUT_KEYWORD: usize = 6;

const MISSING_TEXT: &str = "Request body must contain a text field of type string";
const EMPTY_TEXT: &str = "Text input cannot be empty";
const TOO_SIMPLE: &str =
    "Please provide a more detailed description of the application you want to build";

/// Check a raw request body and build a request from its trimmed `text`
///
/// # Examples
///
/// ```
/// use appspec_extractor::{validate_body, MAX_TEXT_CHARS};
/// use serde_json::json;
///
/// let body = json!({ "text": "  a booking app  " });
/// assert_eq!(validate_body(&body, MAX_TEXT_CHARS).unwrap().text, "a booking app");
/// assert!(validate_body(&json!({ "text": 5 }), MAX_TEXT_CHARS).is_err());
/// ```
pub fn validate_body(body: &Value, max_chars: usize) -> Result<GenerationRequest, ExtractorError> {
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractorError::Validation(MISSING_TEXT.to_string()))?;

    let text = validate_text(text, max_chars)?;
    Ok(GenerationRequest {
        text: text.to_string(),
    })
}

/// Trim `text` and check it is non-empty and within `max_chars`
pub fn validate_text(text: &str, max_chars: usize) -> Result<&str, ExtractorError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ExtractorError::Validation(EMPTY_TEXT.to_string()));
    }

    if trimmed.chars().count() > max_chars {
        return Err(ExtractorError::Validation(format!(
            "Text input exceeds maximum length of {} characters",
            max_chars
        )));
    }

    Ok(trimmed)
}

/// Reject descriptions too thin to extract requirements from
///
/// A description is too simple when it has fewer than three words, or fewer
/// than six words and no application keyword.
pub fn check_prompt_detail(text: &str) -> Result<(), ExtractorError> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let has_keyword = words.iter().any(|w| is_app_keyword(w));

    if words.len() < MIN_WORDS || (words.len() < MIN_WORDS_WITHOUT_KEYWORD && !has_keyword) {
        return Err(ExtractorError::Validation(TOO_SIMPLE.to_string()));
    }

    Ok(())
}

fn is_app_keyword(word: &str) -> bool {
    let singular = word.strip_suffix('s').unwrap_or(word);
    APP_KEYWORDS.contains(&word) || APP_KEYWORDS.contains(&singular)
}
