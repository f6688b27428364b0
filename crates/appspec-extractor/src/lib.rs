//! Appspec Extractor
//!
//! Turns a natural-language application description into structured
//! requirements using an LLM.
//!
//! # Overview
//!
//! Input text is validated, sent to the configured provider with a fixed
//! extraction prompt, and the reply is checked for the expected shape before
//! it is returned. Without a provider the extractor answers from a small set
//! of built-in templates instead.
//!
//! # Architecture
//!
//! ```text
//! Text → InputValidator → Extractor → LLM → ResponseValidator → GenerationResult
//!                                      ↓ (any failure)
//!                              classify → FailureLogSink
//! ```
//!
//! # Example Usage
//!
//! ```
//! use appspec_extractor::{Extractor, ExtractorConfig, FailureLogSink};
//!
//! # tokio_test::block_on(async {
//! // No provider configured: template mode
//! let extractor = Extractor::new(None, FailureLogSink::disabled(), ExtractorConfig::default());
//!
//! let result = extractor.generate("A todo list for my family").await.unwrap();
//! assert_eq!(result.app_name, "TaskFlow");
//! # });
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;
mod extractor;
mod input;
mod prompt;
mod response;
mod sink;
mod template;

#[cfg(test)]
mod tests;

pub use classifier::{classify, ClassifiedError, ErrorFacts};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{Extractor, ExtractorMode};
pub use input::{check_prompt_detail, validate_body, validate_text, MAX_TEXT_CHARS};
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
pub use response::{parse_reply, validate_response};
pub use sink::FailureLogSink;
pub use template::template_result;
