//! Canonical classification results
//!
//! Every result here is an immutable value object. Whichever backend produced
//! it, the caller only ever sees these enum-constrained shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of classification task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Sentiment of a diary entry
    Sentiment,
    /// Safety check of community content
    Moderation,
    /// Meditation category for a mood
    Suggestion,
}

impl TaskKind {
    /// All task kinds, in a stable order
    pub const ALL: [TaskKind; 3] = [Self::Sentiment, Self::Moderation, Self::Suggestion];

    /// Stable name used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Moderation => "moderation",
            Self::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Decided by the remote model
    Remote,
    /// Decided locally because the remote model was unavailable or unusable
    Fallback,
}

impl ResultSource {
    /// Stable name used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Winning label
    pub label: SentimentLabel,

    /// Confidence of the winning label (0.0-1.0)
    pub score: f32,

    /// Remote model or local fallback
    pub source: ResultSource,
}

impl SentimentResult {
    /// Score reported when no opinion is available
    pub const NEUTRAL_SCORE: f32 = 0.5;

    /// Create a result decided by the remote model
    pub fn remote(label: SentimentLabel, score: f32) -> Self {
        Self {
            label,
            score,
            source: ResultSource::Remote,
        }
    }

    /// The fixed "no opinion" result
    pub fn neutral_fallback() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: Self::NEUTRAL_SCORE,
            source: ResultSource::Fallback,
        }
    }
}

/// Outcome of content moderation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Whether the content may be published
    pub passed: bool,

    /// Safety score (0.0-1.0); higher is safer
    pub score: f32,

    /// Why the content was rejected, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Remote model or local fallback
    pub source: ResultSource,
}

impl ModerationResult {
    /// Create a result decided by the remote model
    pub fn remote(passed: bool, score: f32, reason: Option<String>) -> Self {
        Self {
            passed,
            score,
            reason,
            source: ResultSource::Remote,
        }
    }

    /// Create a locally decided result
    pub fn fallback(passed: bool, score: f32, reason: Option<String>) -> Self {
        Self {
            passed,
            score,
            reason,
            source: ResultSource::Fallback,
        }
    }

    /// Rejection used when no verdict could be obtained
    pub fn rejected_unavailable() -> Self {
        Self::fallback(false, 0.0, Some("moderation unavailable".to_string()))
    }
}

/// Meditation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeditationCategory {
    Calm,
    Focus,
    Sleep,
    Breathing,
}

impl MeditationCategory {
    /// All categories, in catalog order
    pub const ALL: [MeditationCategory; 4] =
        [Self::Calm, Self::Focus, Self::Sleep, Self::Breathing];

    /// Category used when nothing else applies
    pub const DEFAULT: MeditationCategory = Self::Calm;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Focus => "focus",
            Self::Sleep => "sleep",
            Self::Breathing => "breathing",
        }
    }

    /// Token naming the category's audio file (`<token>.mp3`)
    pub fn file_token(&self) -> &'static str {
        match self {
            Self::Calm => "calma",
            Self::Focus => "foco",
            Self::Sleep => "sono",
            Self::Breathing => "respiracao",
        }
    }

    /// Audio file name, e.g. `sono.mp3`
    pub fn file_name(&self) -> String {
        format!("{}.mp3", self.file_token())
    }

    /// Look up a category by its file token, ignoring case
    pub fn from_file_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.file_token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for MeditationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeditationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .or_else(|| Self::from_file_token(s))
            .ok_or_else(|| format!("unknown meditation category: {s}"))
    }
}

/// Suggested meditation category for a mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category: MeditationCategory,
    pub source: ResultSource,
}

impl CategorySuggestion {
    pub fn new(category: MeditationCategory, source: ResultSource) -> Self {
        Self { category, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_fallback() {
        let result = SentimentResult::neutral_fallback();
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.5);
        assert_eq!(result.source, ResultSource::Fallback);
    }

    #[test]
    fn test_rejected_unavailable() {
        let result = ModerationResult::rejected_unavailable();
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.source, ResultSource::Fallback);
    }

    #[test]
    fn test_category_tokens() {
        assert_eq!(MeditationCategory::Sleep.file_name(), "sono.mp3");
        assert_eq!(
            MeditationCategory::from_file_token("FOCO"),
            Some(MeditationCategory::Focus)
        );
        assert_eq!(MeditationCategory::from_file_token("yoga"), None);
        assert_eq!(
            "breathing".parse::<MeditationCategory>(),
            Ok(MeditationCategory::Breathing)
        );
        assert_eq!(
            "respiracao".parse::<MeditationCategory>(),
            Ok(MeditationCategory::Breathing)
        );
        assert!("".parse::<MeditationCategory>().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SentimentResult::remote(SentimentLabel::Positive, 0.9))
            .unwrap();
        assert_eq!(json["label"], "positive");
        assert_eq!(json["source"], "remote");

        let json = serde_json::to_value(ModerationResult::remote(true, 0.95, None)).unwrap();
        assert!(json.get("reason").is_none());

        let json = serde_json::to_value(CategorySuggestion::new(
            MeditationCategory::Sleep,
            ResultSource::Fallback,
        ))
        .unwrap();
        assert_eq!(json["category"], "sleep");
        assert_eq!(json["source"], "fallback");
    }
}
