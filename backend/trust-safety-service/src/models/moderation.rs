use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Category reported when the classifier could not be reached
pub const SYSTEM_ERROR_CATEGORY: &str = "moderation_system_error";

/// Message attached to fail-closed results
pub const SERVICE_UNAVAILABLE: &str = "Content moderation service unavailable";

/// Classifier taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationCategory {
    Harassment,
    HarassmentThreatening,
    Hate,
    HateThreatening,
    SelfHarm,
    SelfHarmIntent,
    SelfHarmInstructions,
    Sexual,
    SexualMinors,
    Violence,
    ViolenceGraphic,
}

impl ModerationCategory {
    pub const ALL: [ModerationCategory; 11] = [
        ModerationCategory::Harassment,
        ModerationCategory::HarassmentThreatening,
        ModerationCategory::Hate,
        ModerationCategory::HateThreatening,
        ModerationCategory::SelfHarm,
        ModerationCategory::SelfHarmIntent,
        ModerationCategory::SelfHarmInstructions,
        ModerationCategory::Sexual,
        ModerationCategory::SexualMinors,
        ModerationCategory::Violence,
        ModerationCategory::ViolenceGraphic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationCategory::Harassment => "harassment",
            ModerationCategory::HarassmentThreatening => "harassment/threatening",
            ModerationCategory::Hate => "hate",
            ModerationCategory::HateThreatening => "hate/threatening",
            ModerationCategory::SelfHarm => "self-harm",
            ModerationCategory::SelfHarmIntent => "self-harm/intent",
            ModerationCategory::SelfHarmInstructions => "self-harm/instructions",
            ModerationCategory::Sexual => "sexual",
            ModerationCategory::SexualMinors => "sexual/minors",
            ModerationCategory::Violence => "violence",
            ModerationCategory::ViolenceGraphic => "violence/graphic",
        }
    }
}

/// Kind of user content passing through the blocking gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratedContent {
    Post,
    Challenge,
    Comment,
}

impl ModeratedContent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeratedContent::Post => "post",
            ModeratedContent::Challenge => "challenge",
            ModeratedContent::Comment => "comment",
        }
    }
}

/// Verdict for one submission. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    pub categories: BTreeMap<String, bool>,
    pub category_scores: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModerationResult {
    pub fn unflagged() -> Self {
        Self::default()
    }

    /// Development fallback: let content through, keep the cause
    pub fn fail_open(detail: impl std::fmt::Display) -> Self {
        Self {
            error: Some(format!("Content moderation API error: {}", detail)),
            ..Self::default()
        }
    }

    /// Non-development fallback: block content without exposing the cause
    pub fn fail_closed() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(SYSTEM_ERROR_CATEGORY.to_string(), true);
        Self {
            flagged: true,
            categories,
            category_scores: BTreeMap::new(),
            error: Some(SERVICE_UNAVAILABLE.to_string()),
        }
    }

    /// Names of categories marked true, in key order
    pub fn flagged_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// One item of a classifier batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierInput {
    Text(String),
    ImageUrl(String),
}

/// Text and/or images submitted for moderation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ModerationInput {
    #[validate(length(max = 20000))]
    pub text_content: Option<String>,
    #[validate(length(max = 10))]
    pub image_urls: Option<Vec<String>>,
}

impl ModerationInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text_content: Some(text.into()),
            image_urls: None,
        }
    }

    /// Trimmed text, if any is left after trimming
    pub fn usable_text(&self) -> Option<&str> {
        self.text_content
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn usable_image_urls(&self) -> impl Iterator<Item = &str> {
        self.image_urls
            .iter()
            .flatten()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
    }

    /// Whitespace-only text and blank URLs count as nothing
    pub fn is_empty(&self) -> bool {
        self.usable_text().is_none() && self.usable_image_urls().next().is_none()
    }

    /// Mixed batch for the classifier: text first, then each image
    pub fn classifier_items(&self) -> Vec<ClassifierInput> {
        let mut items = Vec::new();
        if let Some(text) = self.usable_text() {
            items.push(ClassifierInput::Text(text.to_string()));
        }
        items.extend(
            self.usable_image_urls()
                .map(|url| ClassifierInput::ImageUrl(url.to_string())),
        );
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_names() {
        let names: Vec<&str> = ModerationCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"self-harm/instructions"));
        assert!(names.contains(&"sexual/minors"));
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let input = ModerationInput {
            text_content: Some("   \n".to_string()),
            image_urls: Some(vec![" ".to_string()]),
        };
        assert!(input.is_empty());
        assert!(input.classifier_items().is_empty());
        assert!(ModerationInput::default().is_empty());
    }

    #[test]
    fn test_classifier_items_order() {
        let input = ModerationInput {
            text_content: Some(" hello ".to_string()),
            image_urls: Some(vec!["https://a/1.png".to_string(), "".to_string()]),
        };
        assert_eq!(
            input.classifier_items(),
            vec![
                ClassifierInput::Text("hello".to_string()),
                ClassifierInput::ImageUrl("https://a/1.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_fallback_results() {
        let closed = ModerationResult::fail_closed();
        assert!(closed.flagged);
        assert_eq!(closed.flagged_categories(), vec![SYSTEM_ERROR_CATEGORY.to_string()]);
        assert_eq!(closed.error.as_deref(), Some(SERVICE_UNAVAILABLE));

        let open = ModerationResult::fail_open("timeout");
        assert!(!open.flagged);
        assert_eq!(
            open.error.as_deref(),
            Some("Content moderation API error: timeout")
        );
    }

    #[test]
    fn test_error_omitted_when_absent() {
        let json = serde_json::to_value(ModerationResult::unflagged()).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["flagged"], false);
    }
}
