//! Prohibited-term check

use crate::check::{CheckOutcome, ContentCheck};
use aho_corasick::AhoCorasick;
use calma_core::Result;

/// Reason reported when a prohibited term is found
pub const PROHIBITED_TERM_REASON: &str = "inappropriate language";

/// Case-insensitive substring match against a fixed deny-list, using the
/// Aho-Corasick algorithm.
pub struct ProhibitedTermCheck {
    matcher: AhoCorasick,
    terms: Vec<String>,
}

impl ProhibitedTermCheck {
    /// Build the check from a deny-list. Blank terms are ignored.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Terms and text are both lowercased so non-ASCII letters fold too.
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&terms)
            .map_err(|e| {
                calma_core::Error::classifier(format!(
                    "Failed to build prohibited-term matcher: {e}"
                ))
            })?;

        Ok(Self { matcher, terms })
    }

    /// Number of terms in the deny-list
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

impl ContentCheck for ProhibitedTermCheck {
    fn check(&self, text: &str) -> CheckOutcome {
        if self.terms.is_empty() {
            return CheckOutcome::Passed;
        }

        let lowered = text.to_lowercase();
        if self.matcher.is_match(&lowered) {
            let hits = self.matcher.find_iter(&lowered).count();
            CheckOutcome::failed(
                PROHIBITED_TERM_REASON,
                vec![format!("prohibited_terms:{hits}")],
            )
        } else {
            CheckOutcome::Passed
        }
    }

    fn name(&self) -> &str {
        "prohibited_terms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prohibited_terms() {
        let check = ProhibitedTermCheck::new(["idiota", "palavrão"]).unwrap();

        assert!(check.check("hoje foi um dia tranquilo").passed());

        let outcome = check.check("Que IDIOTA");
        assert!(!outcome.passed());
        assert_eq!(outcome.reason(), Some(PROHIBITED_TERM_REASON));
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let check = ProhibitedTermCheck::new(["palavrão"]).unwrap();
        assert!(!check.check("isso é um PALAVRÃO").passed());
    }

    #[test]
    fn test_blank_terms_are_ignored() {
        let check = ProhibitedTermCheck::new(["", "   "]).unwrap();
        assert_eq!(check.term_count(), 0);
        assert!(check.check("anything at all").passed());
    }

    #[test]
    fn test_matched_text_is_not_reported() {
        let check = ProhibitedTermCheck::new(["idiota"]).unwrap();
        match check.check("idiota idiota") {
            CheckOutcome::Failed { matched, .. } => {
                assert_eq!(matched, vec!["prohibited_terms:2".to_string()]);
            }
            CheckOutcome::Passed => panic!("expected failure"),
        }
    }
}
