//! Recommendation domain services
//!
//! - `interactions`: append-only interaction log plus click attribution
//! - `interests`: per-category interest weights fed by interactions
//! - `recommendations`: candidate filtering and impression logging

pub mod interactions;
pub mod interests;
pub mod recommendations;

pub use interactions::{InteractionRecorder, RecordedInteraction};
pub use interests::{InterestUpdateOutcome, InterestUpdater};
pub use recommendations::{RecommendationScorer, PLACEHOLDER_SCORE};

use crate::db::{CatalogRepository, RecommendationLogRepository, Repositories};
use crate::error::{AppError, Result};
use crate::models::{CategoryTag, ContentKind, RecommendationLog, UserInterest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Entry point shared by the HTTP handlers
pub struct RecommendationService {
    pub recorder: InteractionRecorder,
    pub scorer: RecommendationScorer,
    interests: Arc<InterestUpdater>,
    logs: Arc<dyn RecommendationLogRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl RecommendationService {
    pub fn new(repos: Repositories) -> Self {
        let interests = Arc::new(InterestUpdater::new(repos.interests.clone()));

        Self {
            recorder: InteractionRecorder::new(
                repos.interactions.clone(),
                repos.logs.clone(),
                repos.catalog.clone(),
                interests.clone(),
            ),
            scorer: RecommendationScorer::new(
                repos.interests,
                repos.interactions,
                repos.logs.clone(),
                repos.catalog.clone(),
            ),
            interests,
            logs: repos.logs,
            catalog: repos.catalog,
        }
    }

    pub async fn list_user_interests(&self, user_id: Uuid) -> Result<Vec<UserInterest>> {
        self.interests.list_user_interests(user_id).await
    }

    /// Attach (or re-weight) a category on a post or challenge
    pub async fn tag_content(
        &self,
        kind: ContentKind,
        content_id: Uuid,
        category: &str,
        confidence: f64,
    ) -> Result<CategoryTag> {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return Err(AppError::Validation("category must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(AppError::Validation(
                "confidence must be between 0 and 1".to_string(),
            ));
        }

        let tag = self.catalog.tag(kind, content_id, &category, confidence).await?;
        info!(content_id = %content_id, kind = %kind, category = %tag.category, "Content tagged");
        Ok(tag)
    }

    pub async fn content_categories(&self, kind: ContentKind, content_id: Uuid) -> Result<Vec<String>> {
        self.catalog.categories_for(kind, content_id).await
    }

    /// Precise click attribution for a single impression
    pub async fn mark_recommendation_clicked(&self, log_id: Uuid) -> Result<RecommendationLog> {
        self.logs.mark_clicked_by_id(log_id).await
    }
}
