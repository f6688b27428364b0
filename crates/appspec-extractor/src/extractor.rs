//! Core Extractor implementation

use crate::classifier::ClassifiedError;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::input::validate_text;
use crate::prompt::PromptBuilder;
use crate::response::{parse_reply, validate_response};
use crate::sink::FailureLogSink;
use crate::template::template_result;
use appspec_domain::GenerationResult;
use appspec_llm::{LlmError, LlmProvider};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Where results come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorMode {
    /// A provider is configured and called for every request
    Live,
    /// No provider; results come from built-in templates
    Template,
}

impl ExtractorMode {
    /// Short name for health output and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorMode::Live => "live",
            ExtractorMode::Template => "mock",
        }
    }
}

/// The Extractor converts application descriptions into structured requirements
pub struct Extractor {
    provider: Option<Arc<dyn LlmProvider>>,
    sink: FailureLogSink,
    config: ExtractorConfig,
}

impl Extractor {
    /// Create a new Extractor
    ///
    /// With `provider` set to `None` the extractor runs in template mode.
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        sink: FailureLogSink,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            provider,
            sink,
            config,
        }
    }

    /// Current mode
    pub fn mode(&self) -> ExtractorMode {
        if self.provider.is_some() {
            ExtractorMode::Live
        } else {
            ExtractorMode::Template
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Failure sink used by this extractor
    pub fn sink(&self) -> &FailureLogSink {
        &self.sink
    }

    /// Validate `text` and generate requirements for it
    ///
    /// Validation failures return immediately; the provider is not called
    /// and nothing is logged.
    pub async fn generate(&self, text: &str) -> Result<GenerationResult, ExtractorError> {
        let text = validate_text(text, self.config.max_text_length)?;
        self.generate_validated(text).await
    }

    /// Generate requirements for already-validated, trimmed text
    ///
    /// Any failure is classified and queued on the failure sink, then returned
    /// unchanged without waiting for the write.
    pub async fn generate_validated(&self, text: &str) -> Result<GenerationResult, ExtractorError> {
        let Some(provider) = &self.provider else {
            info!("No LLM provider configured, answering from templates");
            return Ok(template_result(text));
        };

        info!(
            "Generating requirements with model '{}', text length {}",
            provider.model_name(),
            text.chars().count()
        );

        let mut raw_reply = None;
        match self.call_provider(provider.as_ref(), text, &mut raw_reply).await {
            Ok(result) => {
                info!(
                    "Generated '{}': {} entities, {} roles, {} features",
                    result.app_name,
                    result.entities.len(),
                    result.user_roles.len(),
                    result.features.len()
                );
                Ok(result)
            }
            Err(e) => {
                let classified = ClassifiedError::new(&e);
                error!(
                    "Generation failed (status {}, source {}): {}",
                    e.status_code(),
                    classified.source,
                    e
                );
                self.sink.record(text, &classified, raw_reply.as_deref());
                Err(e)
            }
        }
    }

    /// One provider round trip: call, parse, shape-check
    ///
    /// `raw_reply` receives the provider text as soon as it arrives, so the
    /// caller can log it if a later step fails.
    async fn call_provider(
        &self,
        provider: &dyn LlmProvider,
        text: &str,
        raw_reply: &mut Option<String>,
    ) -> Result<GenerationResult, ExtractorError> {
        let request = PromptBuilder::new(text).build(&self.config);

        let reply = timeout(self.config.request_timeout(), provider.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.config.request_timeout_secs))??;

        debug!("LLM response length: {} chars", reply.len());

        let reply = raw_reply.insert(reply);
        let value = parse_reply(reply)?;
        validate_response(value)
    }
}
