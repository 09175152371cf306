//! Deterministic stand-in for the classifier in local development.

use crate::models::{ModerationCategory, ModerationInput, ModerationResult};

pub const MOCK_KEYWORDS: [&str; 4] = ["explicit", "violent", "hate", "illegal"];

/// Scores reported for any match, whichever keyword hit
const MOCK_SCORES: [(ModerationCategory, f64); 4] = [
    (ModerationCategory::Harassment, 0.72),
    (ModerationCategory::Hate, 0.81),
    (ModerationCategory::Sexual, 0.86),
    (ModerationCategory::Violence, 0.78),
];

/// Case-insensitive substring match over the text. Images are never flagged.
pub fn screen(input: &ModerationInput) -> ModerationResult {
    let matched = input
        .usable_text()
        .map(|text| text.to_lowercase())
        .map(|text| MOCK_KEYWORDS.iter().any(|keyword| text.contains(keyword)))
        .unwrap_or(false);

    if !matched {
        return ModerationResult::unflagged();
    }

    ModerationResult {
        flagged: true,
        categories: MOCK_SCORES
            .iter()
            .map(|(category, _)| (category.as_str().to_string(), true))
            .collect(),
        category_scores: MOCK_SCORES
            .iter()
            .map(|(category, score)| (category.as_str().to_string(), *score))
            .collect(),
        error: None,
    }
}
