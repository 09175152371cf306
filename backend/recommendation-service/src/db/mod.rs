//! Persistence layer.
//!
//! Each concern sits behind an async repository trait so the services can be
//! exercised without a database; the `Pg*` types are the production
//! implementations over a shared `PgPool`.

pub mod catalog;
pub mod interactions;
pub mod interests;
pub mod recommendation_logs;

pub use catalog::{CatalogRepository, PgCatalogRepository};
pub use interactions::{InteractionRepository, PgInteractionRepository};
pub use interests::{InterestRepository, PgInterestRepository};
pub use recommendation_logs::{PgRecommendationLogRepository, RecommendationLogRepository};

use crate::models::ContentKind;
use sqlx::PgPool;
use std::sync::Arc;

/// Table holding the interaction log for a content kind
pub(crate) fn interaction_table(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Post => "user_post_interactions",
        ContentKind::Challenge => "user_challenge_interactions",
    }
}

/// Table holding category tags for a content kind
pub(crate) fn category_table(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Post => "post_categories",
        ContentKind::Challenge => "challenge_categories",
    }
}

/// Foreign-key column naming the content row in the per-kind tables
pub(crate) fn content_column(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Post => "post_id",
        ContentKind::Challenge => "challenge_id",
    }
}

/// All repositories backed by one pool
#[derive(Clone)]
pub struct Repositories {
    pub interests: Arc<dyn InterestRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub logs: Arc<dyn RecommendationLogRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            interests: Arc::new(PgInterestRepository::new(pool.clone())),
            interactions: Arc::new(PgInteractionRepository::new(pool.clone())),
            logs: Arc::new(PgRecommendationLogRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool)),
        }
    }
}
