//! Local fallback analyzer
//!
//! Deterministic, synchronous decisions used when the remote model cannot
//! provide one. Nothing here touches the network.

use crate::check::{CheckOutcome, ContentCheck};
use crate::patterns::ProhibitedTermCheck;
use crate::pii::PiiCheck;
use crate::suggestion::CategoryMatcher;
use calma_core::{CategorySuggestion, ModerationResult, ResultSource, Result, SentimentResult};
use tracing::debug;

/// Local classifier for all three task kinds
pub struct LocalFallbackAnalyzer {
    checks: Vec<Box<dyn ContentCheck>>,
    categories: CategoryMatcher,
}

impl LocalFallbackAnalyzer {
    /// Create an analyzer with the given deny-list
    pub fn new<I, S>(prohibited_terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let checks = vec![
            Box::new(ProhibitedTermCheck::new(prohibited_terms)?) as Box<dyn ContentCheck>,
            Box::new(PiiCheck::new()?) as Box<dyn ContentCheck>,
        ];

        Ok(Self::with_checks(checks, CategoryMatcher::new()?))
    }

    /// Create an analyzer from explicit checks, run in order
    pub fn with_checks(checks: Vec<Box<dyn ContentCheck>>, categories: CategoryMatcher) -> Self {
        Self { checks, categories }
    }

    /// No local sentiment heuristic exists: always neutral
    pub fn sentiment(&self) -> SentimentResult {
        SentimentResult::neutral_fallback()
    }

    /// Run every check; the first failure rejects the text
    pub fn moderate(&self, text: &str) -> ModerationResult {
        for check in &self.checks {
            if let CheckOutcome::Failed { reason, matched } = check.check(text) {
                debug!(check = check.name(), ?matched, "Local moderation check failed");
                return ModerationResult::fallback(false, 0.0, Some(reason));
            }
        }

        ModerationResult::fallback(true, 1.0, None)
    }

    /// Keyword lookup over the mood, defaulting to calm
    pub fn suggest(&self, mood: &str) -> CategorySuggestion {
        CategorySuggestion::new(self.categories.category_for_mood(mood), ResultSource::Fallback)
    }

    /// Names of the configured checks, in execution order
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }
}
