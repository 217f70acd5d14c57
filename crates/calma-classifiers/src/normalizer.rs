//! Response normalization
//!
//! Converts each backend's raw output into a canonical result. Every response
//! shape is decoded into a typed variant first; anything that does not match
//! is reported as [`Normalized::NeedsFallback`] rather than read optimistically.

use crate::gateway::RawResponse;
use crate::suggestion::{suggestion_prompt, CategoryMatcher};
use calma_core::{
    CategorySuggestion, ModerationResult, ResultSource, SentimentLabel, SentimentResult,
};
use serde::Deserialize;

/// Remote moderation passes only when the "safe" score is strictly above this
pub const MODERATION_PASS_THRESHOLD: f32 = 0.7;

/// Candidate labels sent with zero-shot moderation requests
pub const MODERATION_LABELS: [&str; 2] = ["safe", "unsafe"];

const POSITIVE_LABEL: &str = "POSITIVE";
const NEGATIVE_LABEL: &str = "NEGATIVE";
const SAFE_LABEL: &str = "safe";

/// Why a response could not be normalized
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeFailure {
    /// Body did not match any known response shape
    #[error("unrecognized response shape: {0}")]
    MalformedBody(String),

    /// An expected label was absent
    #[error("label {0} missing from response")]
    MissingLabel(&'static str),

    /// Parallel label and score arrays differ in length
    #[error("response has {labels} labels but {scores} scores")]
    LengthMismatch { labels: usize, scores: usize },

    /// Score outside [0, 1]
    #[error("score {0} outside [0, 1]")]
    ScoreOutOfRange(f32),
}

/// Outcome of normalizing one response
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    /// Canonical result
    Ok(T),

    /// Response unusable; the pipeline must substitute a local result
    NeedsFallback(NormalizeFailure),
}

impl<T> Normalized<T> {
    pub fn into_result(self) -> Result<T, NormalizeFailure> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::NeedsFallback(failure) => Err(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl<T> From<Result<T, NormalizeFailure>> for Normalized<T> {
    fn from(result: Result<T, NormalizeFailure>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(failure) => Self::NeedsFallback(failure),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Text-classification output: `[[{label, score}..]]` or `[{label, score}..]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelScoreBody {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl LabelScoreBody {
    fn into_pairs(self) -> Vec<LabelScore> {
        match self {
            Self::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(pairs) => pairs,
        }
    }
}

/// Zero-shot output: `{labels: [..], scores: [..]}` or a list of pairs
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotBody {
    Columns { labels: Vec<String>, scores: Vec<f32> },
    Pairs(LabelScoreBody),
}

impl ZeroShotBody {
    fn into_pairs(self) -> Result<Vec<LabelScore>, NormalizeFailure> {
        match self {
            Self::Columns { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(NormalizeFailure::LengthMismatch {
                        labels: labels.len(),
                        scores: scores.len(),
                    });
                }
                Ok(labels
                    .into_iter()
                    .zip(scores)
                    .map(|(label, score)| LabelScore { label, score })
                    .collect())
            }
            Self::Pairs(body) => Ok(body.into_pairs()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Generation output: `[{generated_text}]` or `{generated_text}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationBody {
    List(Vec<GeneratedText>),
    Single(GeneratedText),
}

fn decode<'a, T: Deserialize<'a>>(raw: &'a RawResponse) -> Result<T, NormalizeFailure> {
    serde_json::from_str(&raw.body).map_err(|e| NormalizeFailure::MalformedBody(e.to_string()))
}

fn checked_score(score: f32) -> Result<f32, NormalizeFailure> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(NormalizeFailure::ScoreOutOfRange(score))
    }
}

fn find_score(pairs: &[LabelScore], label: &'static str) -> Result<f32, NormalizeFailure> {
    let pair = pairs
        .iter()
        .find(|p| p.label == label)
        .ok_or(NormalizeFailure::MissingLabel(label))?;
    checked_score(pair.score)
}

/// Converts raw backend output into canonical results
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    categories: CategoryMatcher,
}

impl ResponseNormalizer {
    pub fn new(categories: CategoryMatcher) -> Self {
        Self { categories }
    }

    /// Sentiment: the higher of POSITIVE and NEGATIVE wins. A tie goes to
    /// negative.
    pub fn sentiment(&self, raw: &RawResponse) -> Normalized<SentimentResult> {
        self.try_sentiment(raw).into()
    }

    fn try_sentiment(&self, raw: &RawResponse) -> Result<SentimentResult, NormalizeFailure> {
        let pairs = decode::<LabelScoreBody>(raw)?.into_pairs();
        let positive = find_score(&pairs, POSITIVE_LABEL)?;
        let negative = find_score(&pairs, NEGATIVE_LABEL)?;

        Ok(if positive > negative {
            SentimentResult::remote(SentimentLabel::Positive, positive)
        } else {
            SentimentResult::remote(SentimentLabel::Negative, negative)
        })
    }

    /// Moderation: passes when the "safe" score exceeds
    /// [`MODERATION_PASS_THRESHOLD`].
    pub fn moderation(&self, raw: &RawResponse) -> Normalized<ModerationResult> {
        self.try_moderation(raw).into()
    }

    fn try_moderation(&self, raw: &RawResponse) -> Result<ModerationResult, NormalizeFailure> {
        let pairs = decode::<ZeroShotBody>(raw)?.into_pairs()?;
        let safe = find_score(&pairs, SAFE_LABEL)?;
        let passed = safe > MODERATION_PASS_THRESHOLD;
        let reason = (!passed).then(|| "flagged by remote moderation".to_string());

        Ok(ModerationResult::remote(passed, safe, reason))
    }

    /// Suggestion: always yields a category. Only a file token found in the
    /// model output counts as a remote decision.
    pub fn suggestion(&self, raw: &RawResponse, mood: &str) -> CategorySuggestion {
        let text = Self::generated_text(raw, mood);

        match self.categories.extract_file_token(&text) {
            Some(category) => CategorySuggestion::new(category, ResultSource::Remote),
            None => CategorySuggestion::new(
                self.categories.category_for_mood(mood),
                ResultSource::Fallback,
            ),
        }
    }

    /// Generated text with any echoed prompt removed; empty when undecodable.
    fn generated_text(raw: &RawResponse, mood: &str) -> String {
        let text = match decode::<GenerationBody>(raw) {
            Ok(GenerationBody::List(items)) => items
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .unwrap_or_default(),
            Ok(GenerationBody::Single(g)) => g.generated_text,
            Err(_) => String::new(),
        };

        let prompt = suggestion_prompt(mood);
        match text.strip_prefix(prompt.as_str()) {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}
