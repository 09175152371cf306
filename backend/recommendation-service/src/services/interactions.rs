use super::interests::{InterestUpdateOutcome, InterestUpdater};
use crate::db::{CatalogRepository, InteractionRepository, RecommendationLogRepository};
use crate::error::Result;
use crate::metrics::INTERACTIONS_RECORDED_TOTAL;
use crate::models::{ContentKind, Interaction};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything that happened while recording one interaction
#[derive(Debug, Clone, Serialize)]
pub struct RecordedInteraction {
    pub interaction: Interaction,
    /// Recommendation log rows flagged as clicked
    pub clicked_logs: u64,
    pub interests: InterestUpdateOutcome,
}

/// Records user interactions and feeds them back into the interest model
pub struct InteractionRecorder {
    interactions: Arc<dyn InteractionRepository>,
    logs: Arc<dyn RecommendationLogRepository>,
    catalog: Arc<dyn CatalogRepository>,
    interests: Arc<InterestUpdater>,
}

impl InteractionRecorder {
    pub fn new(
        interactions: Arc<dyn InteractionRepository>,
        logs: Arc<dyn RecommendationLogRepository>,
        catalog: Arc<dyn CatalogRepository>,
        interests: Arc<InterestUpdater>,
    ) -> Self {
        Self {
            interactions,
            logs,
            catalog,
            interests,
        }
    }

    pub async fn record_post_interaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        interaction_type: &str,
    ) -> Result<RecordedInteraction> {
        self.record_interaction(ContentKind::Post, user_id, post_id, interaction_type)
            .await
    }

    pub async fn record_challenge_interaction(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        interaction_type: &str,
    ) -> Result<RecordedInteraction> {
        self.record_interaction(ContentKind::Challenge, user_id, challenge_id, interaction_type)
            .await
    }

    /// Append the interaction, mark matching recommendation logs clicked and
    /// update the user's interests from the content's categories.
    ///
    /// Unknown interaction types are stored with the default weight. Interest
    /// updates are best-effort; only the interaction write and click marking
    /// fail the call.
    pub async fn record_interaction(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: &str,
    ) -> Result<RecordedInteraction> {
        let weight = kind.interaction_weight(interaction_type);

        let interaction = self
            .interactions
            .insert(kind, user_id, content_id, interaction_type, weight)
            .await?;

        let type_label = if kind.accepts_interaction(interaction_type) {
            interaction_type
        } else {
            "other"
        };
        INTERACTIONS_RECORDED_TOTAL
            .with_label_values(&[kind.as_str(), type_label])
            .inc();

        // Any interaction counts as a click on every prior recommendation of
        // this content, regardless of which impression it followed.
        let clicked_logs = self.logs.mark_clicked(user_id, content_id, kind).await?;

        let categories = self.catalog.categories_for(kind, content_id).await?;

        let interests = self
            .interests
            .apply_interaction_to_interests(user_id, &categories, weight)
            .await;

        if !interests.is_complete() {
            warn!(
                user_id = %user_id,
                content_id = %content_id,
                failed = ?interests.failed,
                "Interaction recorded with partial interest update"
            );
        }

        info!(
            user_id = %user_id,
            content_id = %content_id,
            kind = %kind,
            interaction_type = %interaction_type,
            weight,
            clicked_logs,
            categories = categories.len(),
            "Interaction recorded"
        );

        Ok(RecordedInteraction {
            interaction,
            clicked_logs,
            interests,
        })
    }
}
