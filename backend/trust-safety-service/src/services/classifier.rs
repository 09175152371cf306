//! External content classifier.
//!
//! Speaks the OpenAI-compatible `/moderations` API: one mixed batch of text
//! and image-URL items in, one verdict per item out.

use crate::config::ModerationConfig;
use crate::error::{Result, TrustSafetyError};
use crate::models::{ClassifierInput, ModerationResult};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Classify a batch; returns one result per input item
    async fn classify(&self, items: &[ClassifierInput]) -> Result<Vec<ModerationResult>>;

    fn name(&self) -> &str;
}

pub struct OpenAiModerationClient {
    client: HttpClient,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiModerationClient {
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrustSafetyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}/moderations", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    /// `None` when no credential is configured
    pub fn from_config(config: &ModerationConfig) -> Result<Option<Self>> {
        config
            .openai_api_key
            .as_deref()
            .map(|key| {
                Self::new(
                    key,
                    &config.openai_base_url,
                    &config.model,
                    Duration::from_secs(config.timeout_secs),
                )
            })
            .transpose()
    }
}

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    model: &'a str,
    input: Vec<InputItem<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputItem<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageRef<'a> },
}

#[derive(Debug, Serialize, PartialEq)]
struct ImageRef<'a> {
    url: &'a str,
}

impl<'a> From<&'a ClassifierInput> for InputItem<'a> {
    fn from(item: &'a ClassifierInput) -> Self {
        match item {
            ClassifierInput::Text(text) => InputItem::Text { text },
            ClassifierInput::ImageUrl(url) => InputItem::ImageUrl {
                image_url: ImageRef { url },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ItemResult>,
}

/// Some providers report `null` for categories that do not apply to an input type
#[derive(Debug, Deserialize)]
struct ItemResult {
    flagged: bool,
    #[serde(default)]
    categories: BTreeMap<String, Option<bool>>,
    #[serde(default)]
    category_scores: BTreeMap<String, Option<f64>>,
}

impl From<ItemResult> for ModerationResult {
    fn from(item: ItemResult) -> Self {
        ModerationResult {
            flagged: item.flagged,
            categories: item
                .categories
                .into_iter()
                .map(|(name, flagged)| (name, flagged.unwrap_or(false)))
                .collect(),
            category_scores: item
                .category_scores
                .into_iter()
                .filter_map(|(name, score)| score.map(|s| (name, s)))
                .collect(),
            error: None,
        }
    }
}

#[async_trait]
impl ContentClassifier for OpenAiModerationClient {
    async fn classify(&self, items: &[ClassifierInput]) -> Result<Vec<ModerationResult>> {
        let request = ModerationRequest {
            model: &self.model,
            input: items.iter().map(InputItem::from).collect(),
        };

        debug!(items = items.len(), model = %self.model, "Calling moderation API");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TrustSafetyError::Classifier(format!(
                "moderation API returned {}: {}",
                status, error_text
            )));
        }

        let parsed: ModerationResponse = response.json().await?;
        if parsed.results.is_empty() {
            return Err(TrustSafetyError::Classifier(
                "moderation API returned no results".to_string(),
            ));
        }

        Ok(parsed.results.into_iter().map(ModerationResult::from).collect())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let items = vec![
            ClassifierInput::Text("hello".to_string()),
            ClassifierInput::ImageUrl("https://cdn/x.png".to_string()),
        ];
        let request = ModerationRequest {
            model: "omni-moderation-latest",
            input: items.iter().map(InputItem::from).collect(),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "omni-moderation-latest",
                "input": [
                    { "type": "text", "text": "hello" },
                    { "type": "image_url", "image_url": { "url": "https://cdn/x.png" } }
                ]
            })
        );
    }

    #[test]
    fn test_response_parsing_tolerates_nulls() {
        let raw = json!({
            "id": "modr-1",
            "model": "omni-moderation-latest",
            "results": [{
                "flagged": true,
                "categories": { "violence": true, "sexual": false, "illicit": null },
                "category_scores": { "violence": 0.91, "sexual": 0.01, "illicit": null },
                "category_applied_input_types": { "violence": ["text"] }
            }]
        });
        let parsed: ModerationResponse = serde_json::from_value(raw).unwrap();
        let result = ModerationResult::from(parsed.results.into_iter().next().unwrap());

        assert!(result.flagged);
        assert_eq!(result.categories.get("illicit"), Some(&false));
        assert_eq!(result.category_scores.get("violence"), Some(&0.91));
        assert!(!result.category_scores.contains_key("illicit"));
        assert_eq!(result.flagged_categories(), vec!["violence".to_string()]);
    }

    #[test]
    fn test_from_config_without_key() {
        let config = ModerationConfig {
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1/".to_string(),
            model: "omni-moderation-latest".to_string(),
            timeout_secs: 10,
        };
        assert!(OpenAiModerationClient::from_config(&config).unwrap().is_none());

        let config = ModerationConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..config
        };
        let client = OpenAiModerationClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.endpoint, "https://api.openai.com/v1/moderations");
        assert_eq!(client.name(), "openai");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let client = OpenAiModerationClient::new(
            "sk-test",
            "http://127.0.0.1:9",
            "omni-moderation-latest",
            Duration::from_millis(500),
        )
        .unwrap();
        let result = client
            .classify(&[ClassifierInput::Text("hi".to_string())])
            .await;
        assert!(matches!(result, Err(TrustSafetyError::Http(_))));
    }
}
