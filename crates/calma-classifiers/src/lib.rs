//! Calma Classifiers
//!
//! Content classification for journaling, community posts, and meditation
//! suggestions.
//!
//! Every task is tried against a remote inference backend first:
//! - [`gateway`] issues the bounded-timeout HTTP call
//! - [`normalizer`] turns each backend's response shape into a canonical result
//! - [`fallback`] decides locally when the remote call fails or is unusable
//! - [`pipeline`] orchestrates the three and always returns a canonical result

pub mod check;
pub mod config;
pub mod fallback;
pub mod gateway;
pub mod normalizer;
pub mod patterns;
pub mod pii;
pub mod pipeline;
pub mod suggestion;

pub use check::{CheckOutcome, ContentCheck};
pub use config::{CalmaConfig, InferenceConfig, ModelSet, ModerationConfig};
pub use fallback::LocalFallbackAnalyzer;
pub use gateway::{
    HttpInferenceGateway, InferenceGateway, InferencePayload, RawResponse, TransportFailure,
};
pub use normalizer::{NormalizeFailure, Normalized, ResponseNormalizer, MODERATION_PASS_THRESHOLD};
pub use pipeline::{ClassificationPipeline, FallbackReason, ModerationFailurePolicy};
pub use suggestion::CategoryMatcher;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::CalmaConfig;
    pub use crate::gateway::{HttpInferenceGateway, InferenceGateway};
    pub use crate::pipeline::{ClassificationPipeline, ModerationFailurePolicy};
    pub use calma_core::prelude::*;
}
