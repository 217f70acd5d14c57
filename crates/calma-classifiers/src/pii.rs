//! Personal-information check using regex patterns

use crate::check::{CheckOutcome, ContentCheck};
use calma_core::Result;
use regex::Regex;

/// Reason reported when personal information is found
pub const PERSONAL_INFO_REASON: &str = "personal information";

/// Detects phone numbers, email addresses, and CPF numbers
pub struct PiiCheck {
    patterns: Vec<(&'static str, Regex)>,
}

impl PiiCheck {
    /// Create a new PII check
    pub fn new() -> Result<Self> {
        let compile = |kind: &'static str, pattern: &str| {
            Regex::new(pattern)
                .map(|re| (kind, re))
                .map_err(|e| {
                    calma_core::Error::classifier(format!("Failed to compile {kind} regex: {e}"))
                })
        };

        Ok(Self {
            patterns: vec![
                // (11) 98765-4321, (11)3456-7890
                compile("phone", r"\([0-9]{2}\)\s?[0-9]{4,5}-?[0-9]{4}")?,
                compile("email", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")?,
                // 123.456.789-09 or eleven bare digits; ASCII digits only
                compile("cpf", r"[0-9]{3}\.?[0-9]{3}\.?[0-9]{3}-?[0-9]{2}")?,
            ],
        })
    }
}

impl ContentCheck for PiiCheck {
    fn check(&self, text: &str) -> CheckOutcome {
        let matched: Vec<String> = self
            .patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(kind, _)| kind.to_string())
            .collect();

        if matched.is_empty() {
            CheckOutcome::Passed
        } else {
            CheckOutcome::failed(PERSONAL_INFO_REASON, matched)
        }
    }

    fn name(&self) -> &str {
        "personal_information"
    }
}
