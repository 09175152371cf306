use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Accumulated affinity of a user for one category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserInterest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    /// Always within `0.0..=INTEREST_WEIGHT_CEILING`
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written by an interest upsert and whether it was newly created
#[derive(Debug, Clone, FromRow)]
pub struct InterestUpsert {
    #[sqlx(flatten)]
    pub interest: UserInterest,
    pub created: bool,
}
