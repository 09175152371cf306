//! Interest model updater.
//!
//! Interactions feed a per-user, per-category weight:
//!
//! - first touch on a category bootstraps at `w * 0.2`
//! - every later touch adds `w * 0.1`
//! - weights are capped at 10.0 and never decay
//!
//! Each category is a single atomic upsert, so concurrent interactions on
//! the same category all land. A failure on one category is
//! logged and reported in the outcome; the remaining categories still apply.

use crate::db::InterestRepository;
use crate::error::Result;
use crate::metrics::INTEREST_UPDATES_TOTAL;
use crate::models::UserInterest;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const INTEREST_WEIGHT_CEILING: f64 = 10.0;
pub const BOOTSTRAP_FACTOR: f64 = 0.2;
pub const REINFORCEMENT_FACTOR: f64 = 0.1;

/// Weight of a freshly created interest
pub fn bootstrap_weight(interaction_weight: f64) -> f64 {
    (interaction_weight * BOOTSTRAP_FACTOR).clamp(0.0, INTEREST_WEIGHT_CEILING)
}

/// Per-category result of applying one interaction
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct InterestUpdateOutcome {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub failed: Vec<String>,
}

impl InterestUpdateOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

enum CategoryUpdate {
    Created,
    Updated,
}

pub struct InterestUpdater {
    repo: Arc<dyn InterestRepository>,
}

impl InterestUpdater {
    pub fn new(repo: Arc<dyn InterestRepository>) -> Self {
        Self { repo }
    }

    /// Fold one interaction into the user's interest weights for every
    /// category tagged on the interacted content.
    pub async fn apply_interaction_to_interests(
        &self,
        user_id: Uuid,
        content_categories: &[String],
        interaction_weight: f64,
    ) -> InterestUpdateOutcome {
        let mut outcome = InterestUpdateOutcome::default();

        for category in content_categories {
            match self.apply_one(user_id, category, interaction_weight).await {
                Ok(CategoryUpdate::Created) => {
                    INTEREST_UPDATES_TOTAL.with_label_values(&["created"]).inc();
                    outcome.created.push(category.clone());
                }
                Ok(CategoryUpdate::Updated) => {
                    INTEREST_UPDATES_TOTAL.with_label_values(&["updated"]).inc();
                    outcome.updated.push(category.clone());
                }
                Err(e) => {
                    INTEREST_UPDATES_TOTAL.with_label_values(&["failed"]).inc();
                    warn!(
                        user_id = %user_id,
                        category = %category,
                        error = %e,
                        "Interest update failed, continuing with remaining categories"
                    );
                    outcome.failed.push(category.clone());
                }
            }
        }

        outcome
    }

    async fn apply_one(
        &self,
        user_id: Uuid,
        category: &str,
        interaction_weight: f64,
    ) -> Result<CategoryUpdate> {
        let upserted = self
            .repo
            .upsert(
                user_id,
                category,
                bootstrap_weight(interaction_weight),
                interaction_weight * REINFORCEMENT_FACTOR,
                INTEREST_WEIGHT_CEILING,
            )
            .await?;

        debug!(
            user_id = %user_id,
            category = %category,
            weight = upserted.interest.weight,
            created = upserted.created,
            "Interest upserted"
        );

        Ok(if upserted.created {
            CategoryUpdate::Created
        } else {
            CategoryUpdate::Updated
        })
    }

    /// Interests of a user, heaviest first
    pub async fn list_user_interests(&self, user_id: Uuid) -> Result<Vec<UserInterest>> {
        self.repo.list_for_user(user_id).await
    }
}
