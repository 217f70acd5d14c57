//! Local content checks

/// A synchronous, deterministic check over a piece of text
pub trait ContentCheck: Send + Sync {
    /// Check the given text
    fn check(&self, text: &str) -> CheckOutcome;

    /// Get the check name
    fn name(&self) -> &str;
}

/// Outcome of a local check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing objectionable found
    Passed,

    /// The text must not be published
    Failed {
        /// User-facing reason
        reason: String,

        /// What matched (term categories or PII kinds, never the matched text)
        matched: Vec<String>,
    },
}

impl CheckOutcome {
    /// Create a failed outcome
    pub fn failed(reason: impl Into<String>, matched: Vec<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            matched,
        }
    }

    /// Whether the check passed
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Rejection reason, if the check failed
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }
}
