//! Input normalization and Norwegian/English language detection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Words that mark a brief as Norwegian. Counted once each, whole-word.
const NORWEGIAN_WORDS: &[&str] = &[
    "og", "på", "med", "til", "vi", "skal", "dager", "dag", "opptak", "reklame", "kunde",
    "kunden", "ønsker", "trenger", "ikke", "utenfor", "mellom", "eller", "fra", "som", "av",
    "det", "er", "en", "et", "har", "hvor", "uke", "uker", "sted", "steder", "lokasjoner",
];

/// Words that mark a brief as English. Counted once each, whole-word.
const ENGLISH_WORDS: &[&str] = &[
    "and", "the", "with", "we", "will", "days", "day", "shoot", "shooting", "commercial",
    "client", "want", "need", "needs", "not", "outside", "between", "or", "from", "which", "of",
    "is", "in", "our", "looking", "locations", "crew", "week",
];

/// Bonus added to the Norwegian score when the text contains æ, ø or å.
const NORWEGIAN_LETTER_BONUS: u32 = 3;

/// Detected brief language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    No,
    En,
    Mixed,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::No => "no",
            Language::En => "en",
            Language::Mixed => "mixed",
        }
    }
}

/// Language label together with the raw scores that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageScore {
    pub label: Language,
    pub norwegian: u32,
    pub english: u32,
}

/// Lower-case the brief for matching. Returns `None` for empty or whitespace-only input.
pub fn normalize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn tokens(lower: &str) -> HashSet<&str> {
    lower
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Score Norwegian against English cues in already lower-cased text.
pub fn detect_language(lower: &str) -> LanguageScore {
    let words = tokens(lower);

    let letter_bonus = if lower.chars().any(|c| matches!(c, 'æ' | 'ø' | 'å')) {
        NORWEGIAN_LETTER_BONUS
    } else {
        0
    };

    let norwegian = letter_bonus
        + NORWEGIAN_WORDS.iter().filter(|w| words.contains(**w)).count() as u32;
    let english = ENGLISH_WORDS.iter().filter(|w| words.contains(**w)).count() as u32;

    let label = if norwegian > english + 1 {
        Language::No
    } else if english > norwegian + 1 {
        Language::En
    } else {
        Language::Mixed
    };

    LanguageScore {
        label,
        norwegian,
        english,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rejects_blank() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   \n\t"), None);
        assert_eq!(normalize("  Reklame i OSLO "), Some("reklame i oslo".to_string()));
    }

    #[test]
    fn test_norwegian_letters_weigh_in() {
        let score = detect_language("dokumentar i tromsø, 5 dager");
        assert_eq!(score.norwegian, 4);
        assert_eq!(score.english, 0);
        assert_eq!(score.label, Language::No);
    }

    #[test]
    fn test_english_detection() {
        let score = detect_language("we need a crew for the commercial shoot in bergen");
        assert_eq!(score.label, Language::En);
    }

    #[test]
    fn test_close_scores_are_mixed() {
        let score = detect_language("commercial med drone");
        assert_eq!(score.label, Language::Mixed);
    }

    #[test]
    fn test_words_counted_once() {
        let score = detect_language("the the the the");
        assert_eq!(score.english, 1);
        assert_eq!(score.label, Language::Mixed);
    }
}
