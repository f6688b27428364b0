//! Appspec Domain Layer
//!
//! Core data model shared by every other crate: the structured requirements
//! produced for a caller, and the diagnostic records written when producing
//! them fails.
//!
//! ## Key Concepts
//!
//! - **GenerationRequest**: free-form description of an application
//! - **GenerationResult**: app name, entities, user roles and features
//! - **FailureRecord**: append-only diagnostic entry for a failed attempt
//! - **ErrorSource**: the category a failure was classified into
//!
//! ## Architecture
//!
//! - Pure data and small helpers only
//! - No I/O; provider and storage capabilities live in their own crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error_source;
pub mod failure;
pub mod requirements;

// Re-exports for convenience
pub use error_source::ErrorSource;
pub use failure::{
    truncate_chars, FailureId, FailureRecord, MAX_ERROR_MESSAGE_CHARS, MAX_USER_INPUT_CHARS,
};
pub use requirements::{Entity, Feature, GenerationRequest, GenerationResult, UserRole};
