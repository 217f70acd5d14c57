//! Meditation category matching
//!
//! The cascade used for suggestions, remote or not:
//! 1. the first `<token>.mp3` named in the model output
//! 2. the first mood keyword found in the user's mood
//! 3. [`MeditationCategory::DEFAULT`]

use calma_core::{MeditationCategory, Result};
use regex::Regex;

/// Fixed lookup from mood keywords to categories. First entry wins.
const MOOD_KEYWORDS: &[(&str, MeditationCategory)] = &[
    ("ansios", MeditationCategory::Calm),
    ("anxious", MeditationCategory::Calm),
    ("estressad", MeditationCategory::Calm),
    ("stressed", MeditationCategory::Calm),
    ("nervos", MeditationCategory::Calm),
    ("cansad", MeditationCategory::Focus),
    ("tired", MeditationCategory::Focus),
    ("distraíd", MeditationCategory::Focus),
    ("distraid", MeditationCategory::Focus),
    ("unfocused", MeditationCategory::Focus),
    ("feliz", MeditationCategory::Sleep),
    ("happy", MeditationCategory::Sleep),
    ("insônia", MeditationCategory::Sleep),
    ("insonia", MeditationCategory::Sleep),
    ("sleepy", MeditationCategory::Sleep),
    ("ofegante", MeditationCategory::Breathing),
    ("breathless", MeditationCategory::Breathing),
    ("pânico", MeditationCategory::Breathing),
    ("panico", MeditationCategory::Breathing),
    ("panic", MeditationCategory::Breathing),
];

/// Upper bound on generated tokens; the answer is a single file name
pub const SUGGESTION_MAX_NEW_TOKENS: u32 = 20;

/// Build the generation prompt for a mood
pub fn suggestion_prompt(mood: &str) -> String {
    format!(
        "Com base no humor \"{mood}\", qual meditação seria mais adequada entre as opções: \
         \"calma.mp3\" (para ansiedade), \"foco.mp3\" (para cansaço), \"sono.mp3\" (para relaxamento) \
         ou \"respiracao.mp3\" (para falta de ar)? Responda apenas com o nome do arquivo."
    )
}

/// Maps model output and moods onto the closed category set
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    file_token: Regex,
}

impl CategoryMatcher {
    pub fn new() -> Result<Self> {
        let file_token = Regex::new(r"(?i)(calma|foco|sono|respira[cç][aã]o)\.mp3").map_err(|e| {
            calma_core::Error::classifier(format!("Failed to compile category regex: {e}"))
        })?;

        Ok(Self { file_token })
    }

    /// First category file named in `text`, if any
    pub fn extract_file_token(&self, text: &str) -> Option<MeditationCategory> {
        let token = self.file_token.captures(text)?.get(1)?.as_str();
        let folded: String = token
            .chars()
            .map(|c| match c {
                'ç' | 'Ç' => 'c',
                'ã' | 'Ã' => 'a',
                other => other,
            })
            .collect();
        MeditationCategory::from_file_token(&folded)
    }

    /// Category for the first mood keyword contained in `mood`, if any
    pub fn match_mood(&self, mood: &str) -> Option<MeditationCategory> {
        let mood = mood.to_lowercase();
        MOOD_KEYWORDS
            .iter()
            .find(|(keyword, _)| mood.contains(keyword))
            .map(|(_, category)| *category)
    }

    /// Keyword lookup, falling back to the default category
    pub fn category_for_mood(&self, mood: &str) -> MeditationCategory {
        self.match_mood(mood).unwrap_or(MeditationCategory::DEFAULT)
    }
}
