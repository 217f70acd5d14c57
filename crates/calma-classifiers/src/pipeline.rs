//! Classification pipeline
//!
//! Each task runs the same state machine to completion within one call:
//!
//! ```text
//! START -> CALL_REMOTE -> NORMALIZE_OK                      -> DONE
//!                      -> NORMALIZE_FAIL    -> LOCAL_FALLBACK -> DONE
//!                      -> TRANSPORT_FAILURE -> LOCAL_FALLBACK -> DONE
//! ```
//!
//! Callers always receive a canonical result. This is the one place that
//! decides which fallback applies to each task kind.

use crate::config::{CalmaConfig, ModelSet};
use crate::fallback::LocalFallbackAnalyzer;
use crate::gateway::{InferenceGateway, InferencePayload, RawResponse, TransportFailure};
use crate::normalizer::{NormalizeFailure, ResponseNormalizer, MODERATION_LABELS};
use crate::suggestion::{suggestion_prompt, CategoryMatcher, SUGGESTION_MAX_NEW_TOKENS};
use calma_core::{
    CategorySuggestion, ModerationResult, Result, ResultSource, SentimentResult, TaskKind,
};
use calma_telemetry::ClassificationMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// What moderation does when no remote verdict is available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationFailurePolicy {
    /// Reject: `passed=false, score=0`
    #[default]
    FailClosed,

    /// Decide with the local prohibited-term and personal-information checks
    LocalChecks,
}

/// Why a task was decided locally
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FallbackReason {
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    #[error(transparent)]
    Normalize(#[from] NormalizeFailure),

    /// Model output named no category; the keyword cascade decided
    #[error("model output named no category")]
    UnmatchedSuggestion,
}

impl FallbackReason {
    /// Stable reason name used in logs and metric labels
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transport(failure) => failure.kind(),
            Self::Normalize(_) => "normalize_failed",
            Self::UnmatchedSuggestion => "unmatched_output",
        }
    }
}

/// Orchestrates remote classification with local fallback
pub struct ClassificationPipeline {
    gateway: Arc<dyn InferenceGateway>,
    models: ModelSet,
    normalizer: ResponseNormalizer,
    fallback: LocalFallbackAnalyzer,
    moderation_policy: ModerationFailurePolicy,
    metrics: ClassificationMetrics,
}

impl ClassificationPipeline {
    /// Create a pipeline with the default deny-list and a fail-closed
    /// moderation policy
    pub fn new(gateway: Arc<dyn InferenceGateway>, models: ModelSet) -> Result<Self> {
        let moderation = crate::config::ModerationConfig::default();
        Ok(Self {
            gateway,
            models,
            normalizer: ResponseNormalizer::new(CategoryMatcher::new()?),
            fallback: LocalFallbackAnalyzer::new(&moderation.prohibited_terms)?,
            moderation_policy: moderation.failure_policy,
            metrics: ClassificationMetrics::new(),
        })
    }

    /// Create a pipeline from configuration
    pub fn from_config(config: &CalmaConfig, gateway: Arc<dyn InferenceGateway>) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(gateway, config.models.clone())?
            .with_fallback(LocalFallbackAnalyzer::new(&config.moderation.prohibited_terms)?)
            .with_moderation_policy(config.moderation.failure_policy))
    }

    /// Replace the local fallback analyzer
    pub fn with_fallback(mut self, fallback: LocalFallbackAnalyzer) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the moderation failure policy
    pub fn with_moderation_policy(mut self, policy: ModerationFailurePolicy) -> Self {
        self.moderation_policy = policy;
        self
    }

    /// Share a metrics collector
    pub fn with_metrics(mut self, metrics: ClassificationMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn moderation_policy(&self) -> ModerationFailurePolicy {
        self.moderation_policy
    }

    pub fn metrics(&self) -> &ClassificationMetrics {
        &self.metrics
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    /// Sentiment of a diary entry. Falls back to neutral.
    pub async fn classify_sentiment(&self, text: &str) -> SentimentResult {
        let start = Instant::now();
        let payload = InferencePayload::text(text);

        let outcome: std::result::Result<_, FallbackReason> = match self
            .call_remote(TaskKind::Sentiment, &self.models.sentiment, &payload)
            .await
        {
            Ok(raw) => self.normalizer.sentiment(&raw).into_result().map_err(Into::into),
            Err(failure) => Err(FallbackReason::from(failure)),
        };

        let (result, reason) = match outcome {
            Ok(result) => (result, None),
            Err(reason) => (self.fallback.sentiment(), Some(reason)),
        };

        self.complete(TaskKind::Sentiment, result.source, start, reason.as_ref());
        result
    }

    /// Safety verdict for community content. Without a remote verdict the
    /// configured [`ModerationFailurePolicy`] decides.
    pub async fn classify_moderation(&self, text: &str) -> ModerationResult {
        let start = Instant::now();
        let payload = InferencePayload::zero_shot(text, MODERATION_LABELS);

        let outcome: std::result::Result<_, FallbackReason> = match self
            .call_remote(TaskKind::Moderation, &self.models.moderation, &payload)
            .await
        {
            Ok(raw) => self.normalizer.moderation(&raw).into_result().map_err(Into::into),
            Err(failure) => Err(FallbackReason::from(failure)),
        };

        let (result, reason) = match outcome {
            Ok(result) => (result, None),
            Err(reason) => {
                let result = match self.moderation_policy {
                    ModerationFailurePolicy::FailClosed => ModerationResult::rejected_unavailable(),
                    ModerationFailurePolicy::LocalChecks => self.fallback.moderate(text),
                };
                (result, Some(reason))
            }
        };

        self.complete(TaskKind::Moderation, result.source, start, reason.as_ref());
        result
    }

    /// Moderate a community post; title and body are checked together.
    pub async fn moderate_post(&self, title: &str, content: &str) -> ModerationResult {
        self.classify_moderation(&format!("{title} {content}")).await
    }

    /// Meditation category for a mood. Always one of the fixed categories.
    pub async fn suggest_category(&self, mood: &str) -> CategorySuggestion {
        let start = Instant::now();
        let payload =
            InferencePayload::generation(suggestion_prompt(mood), SUGGESTION_MAX_NEW_TOKENS);

        let (result, reason) = match self
            .call_remote(TaskKind::Suggestion, &self.models.suggestion, &payload)
            .await
        {
            Ok(raw) => {
                let result = self.normalizer.suggestion(&raw, mood);
                let reason = match result.source {
                    ResultSource::Remote => None,
                    ResultSource::Fallback => Some(FallbackReason::UnmatchedSuggestion),
                };
                (result, reason)
            }
            Err(failure) => (self.fallback.suggest(mood), Some(FallbackReason::from(failure))),
        };

        self.complete(TaskKind::Suggestion, result.source, start, reason.as_ref());
        result
    }

    async fn call_remote(
        &self,
        task: TaskKind,
        model: &str,
        payload: &InferencePayload,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        debug!(task = %task, model, gateway = self.gateway.name(), "Calling remote model");
        self.gateway.invoke(task, model, payload).await
    }

    fn complete(
        &self,
        task: TaskKind,
        source: ResultSource,
        start: Instant,
        reason: Option<&FallbackReason>,
    ) {
        let latency_us = start.elapsed().as_micros() as u64;

        match reason {
            Some(reason) => warn!(
                task = %task,
                source = %source,
                reason = reason.label(),
                error = %reason,
                latency_us,
                "Remote classification unusable, decided locally"
            ),
            None => debug!(task = %task, source = %source, latency_us, "Classification complete"),
        }

        self.metrics
            .record(task, source, latency_us, reason.map(FallbackReason::label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calma_core::{MeditationCategory, SentimentLabel};

    // Gateway that answers every task with the same outcome
    struct FixedGateway {
        outcome: std::result::Result<String, TransportFailure>,
    }

    #[async_trait]
    impl InferenceGateway for FixedGateway {
        async fn invoke(
            &self,
            task: TaskKind,
            model: &str,
            _payload: &InferencePayload,
        ) -> std::result::Result<RawResponse, TransportFailure> {
            self.outcome
                .clone()
                .map(|body| RawResponse::new(task, model, body))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline(outcome: std::result::Result<&str, TransportFailure>) -> ClassificationPipeline {
        let gateway = Arc::new(FixedGateway {
            outcome: outcome.map(String::from),
        });
        ClassificationPipeline::new(gateway, ModelSet::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sentiment_remote() {
        let p = pipeline(Ok(
            r#"[{"label":"POSITIVE","score":0.9},{"label":"NEGATIVE","score":0.1}]"#,
        ));
        let result = p.classify_sentiment("que dia bom").await;

        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.score, 0.9);
        assert_eq!(result.source, ResultSource::Remote);
    }

    #[tokio::test]
    async fn test_sentiment_transport_failure() {
        let p = pipeline(Err(TransportFailure::Timeout));
        let result = p.classify_sentiment("que dia bom").await;

        assert_eq!(result, SentimentResult::neutral_fallback());
        assert_eq!(p.metrics().snapshot().sentiment.fallback, 1);
    }

    #[tokio::test]
    async fn test_moderation_fail_closed_by_default() {
        let p = pipeline(Err(TransportFailure::Network("connection refused".into())));
        assert_eq!(p.moderation_policy(), ModerationFailurePolicy::FailClosed);

        let result = p.classify_moderation("Um texto tranquilo").await;
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
    }

    #[tokio::test]
    async fn test_moderation_local_checks_policy() {
        let p = pipeline(Err(TransportFailure::Http { status: 503 }))
            .with_moderation_policy(ModerationFailurePolicy::LocalChecks);

        assert!(p.classify_moderation("Um texto tranquilo").await.passed);
        assert!(!p.classify_moderation("meu email: a@b.com").await.passed);
    }

    #[tokio::test]
    async fn test_suggestion_unmatched_output_counts_as_fallback() {
        let p = pipeline(Ok(r#"[{"generated_text":"Tente descansar."}]"#));
        let result = p.suggest_category("cansado").await;

        assert_eq!(result.category, MeditationCategory::Focus);
        assert_eq!(result.source, ResultSource::Fallback);
        assert_eq!(p.metrics().snapshot().suggestion.fallback, 1);
    }

    #[test]
    fn test_fallback_reason_labels() {
        assert_eq!(FallbackReason::from(TransportFailure::Timeout).label(), "timeout");
        assert_eq!(
            FallbackReason::from(NormalizeFailure::MissingLabel("safe")).label(),
            "normalize_failed"
        );
        assert_eq!(FallbackReason::UnmatchedSuggestion.label(), "unmatched_output");
    }

    #[test]
    fn test_policy_serde() {
        let policy: ModerationFailurePolicy = serde_yaml::from_str("local_checks").unwrap();
        assert_eq!(policy, ModerationFailurePolicy::LocalChecks);
        let policy: ModerationFailurePolicy = serde_yaml::from_str("fail_closed").unwrap();
        assert_eq!(policy, ModerationFailurePolicy::FailClosed);
    }
}
