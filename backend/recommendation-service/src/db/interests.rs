use crate::error::Result;
use crate::models::{InterestUpsert, UserInterest};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait InterestRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserInterest>>;

    /// Create the `(user_id, category)` row at `bootstrap`, or add
    /// `increment` to the stored weight capped at `ceiling`, in one atomic
    /// statement.
    async fn upsert(
        &self,
        user_id: Uuid,
        category: &str,
        bootstrap: f64,
        increment: f64,
        ceiling: f64,
    ) -> Result<InterestUpsert>;
}

pub struct PgInterestRepository {
    pool: PgPool,
}

impl PgInterestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterestRepository for PgInterestRepository {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserInterest>> {
        let interests = sqlx::query_as::<_, UserInterest>(
            r#"
            SELECT id, user_id, category, weight, created_at, updated_at
            FROM user_interests
            WHERE user_id = $1
            ORDER BY weight DESC, category ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(interests)
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        category: &str,
        bootstrap: f64,
        increment: f64,
        ceiling: f64,
    ) -> Result<InterestUpsert> {
        // xmax is zero only for a row this statement inserted
        let upserted = sqlx::query_as::<_, InterestUpsert>(
            r#"
            INSERT INTO user_interests (id, user_id, category, weight, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (user_id, category) DO UPDATE
            SET weight = LEAST(user_interests.weight + $6, $7),
                updated_at = $5
            RETURNING id, user_id, category, weight, created_at, updated_at,
                      (xmax = 0) AS created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(category)
        .bind(bootstrap)
        .bind(Utc::now())
        .bind(increment)
        .bind(ceiling)
        .fetch_one(&self.pool)
        .await?;

        Ok(upserted)
    }
}
