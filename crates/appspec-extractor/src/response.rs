//! Parse and shape-check provider replies

use crate::error::ExtractorError;
use appspec_domain::GenerationResult;
use serde_json::Value;

/// Top-level keys every reply must carry, in the order they are checked
const REQUIRED_FIELDS: [&str; 4] = ["appName", "entities", "userRoles", "features"];

/// Parse provider text into JSON
///
/// Markdown code fences around the payload are stripped first. Blank text is
/// an [`ExtractorError::EmptyResponse`]; anything else that is not JSON is an
/// [`ExtractorError::Parsing`].
pub fn parse_reply(reply: &str) -> Result<Value, ExtractorError> {
    let json_str = strip_code_fence(reply);
    if json_str.trim().is_empty() {
        return Err(ExtractorError::EmptyResponse);
    }

    Ok(serde_json::from_str(json_str)?)
}

/// Payload inside a ```` ``` ```` / ```` ```json ```` block, or the trimmed reply
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the language tag line, then drop the closing fence if present.
    // A single-line block has no tag line; only a bare `json` tag is dropped.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Check a parsed reply has the required shape and convert it
///
/// Checks stop at the first failure: object-ness, then presence of each
/// required key in order, then `appName`, `entities`, `userRoles` and
/// `features` content. Items inside the lists are not inspected.
pub fn validate_response(value: Value) -> Result<GenerationResult, ExtractorError> {
    check_shape(&value)?;

    serde_json::from_value(value).map_err(|e| {
        ExtractorError::Structure(format!("Invalid response structure from LLM: {}", e))
    })
}

fn check_shape(value: &Value) -> Result<(), ExtractorError> {
    let obj = value
        .as_object()
        .ok_or_else(|| structure("Invalid response structure from LLM"))?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
        return Err(structure(&format!(
            "Missing required field: {} in LLM response",
            missing
        )));
    }

    let app_name_ok = obj["appName"]
        .as_str()
        .is_some_and(|name| !name.trim().is_empty());
    if !app_name_ok {
        return Err(structure("Invalid appName in LLM response"));
    }

    for field in ["entities", "userRoles", "features"] {
        let non_empty = obj[field].as_array().is_some_and(|items| !items.is_empty());
        if !non_empty {
            return Err(structure(&format!("Invalid {} in LLM response", field)));
        }
    }

    Ok(())
}

fn structure(message: &str) -> ExtractorError {
    ExtractorError::Structure(message.to_string())
}
