//! LLM prompt engineering for requirements extraction

use crate::config::ExtractorConfig;
use appspec_llm::ChatRequest;

/// Builds the provider request for one description
pub struct PromptBuilder<'a> {
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for already-validated text
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Build the chat request: fixed system prompt, description as the user message
    pub fn build(&self, config: &ExtractorConfig) -> ChatRequest {
        ChatRequest::new(SYSTEM_PROMPT, self.text)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
    }
}

/// System prompt sent with every extraction call
pub const SYSTEM_PROMPT: &str = r#"You are a software requirements analyst. Read the user's description of an application and extract its structured requirements.

Respond with a single JSON object and nothing else. Use exactly this shape:

{
  "appName": "Short name for the application",
  "entities": [
    { "name": "EntityName", "attributes": ["attribute1", "attribute2"] }
  ],
  "userRoles": [
    { "name": "RoleName", "description": "What this role does" }
  ],
  "features": [
    { "name": "FeatureName", "description": "What this feature does" }
  ]
}

Rules:
- appName must be a non-empty string
- entities, userRoles and features must each contain at least one item
- Infer reasonable entities, roles and features when the description is vague
- Attribute names are camelCase

Return ONLY valid JSON: no markdown code blocks, no explanations, no trailing text."#;
