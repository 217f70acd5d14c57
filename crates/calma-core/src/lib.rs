//! Calma Core
//!
//! Core types shared across the Calma classification components.
//!
//! This crate provides:
//! - Canonical results for sentiment, moderation, and meditation suggestions
//! - Error types and result handling
//! - Mood statistics over classified diary entries

pub mod error;
pub mod stats;
pub mod types;

pub use error::{Error, Result};
pub use stats::{DailySentiment, DiaryEntrySummary, SentimentCounts, SentimentStats};
pub use types::{
    CategorySuggestion, MeditationCategory, ModerationResult, ResultSource, SentimentLabel,
    SentimentResult, TaskKind,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        CategorySuggestion, MeditationCategory, ModerationResult, ResultSource, SentimentLabel,
        SentimentResult, TaskKind,
    };
}
