use crate::error::{AppError, Result};
use crate::models::{ContentKind, RecommendationLog};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait RecommendationLogRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        kind: ContentKind,
        score: f64,
        was_shown: bool,
    ) -> Result<RecommendationLog>;

    /// Flag every log row for this (user, content, kind) triple as clicked.
    /// Returns the number of rows touched.
    async fn mark_clicked(&self, user_id: Uuid, content_id: Uuid, kind: ContentKind)
        -> Result<u64>;

    async fn mark_clicked_by_id(&self, log_id: Uuid) -> Result<RecommendationLog>;
}

pub struct PgRecommendationLogRepository {
    pool: PgPool,
}

impl PgRecommendationLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationLogRepository for PgRecommendationLogRepository {
    async fn insert(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        kind: ContentKind,
        score: f64,
        was_shown: bool,
    ) -> Result<RecommendationLog> {
        let log = sqlx::query_as::<_, RecommendationLog>(
            r#"
            INSERT INTO recommendation_logs (
                id, user_id, content_id, content_type, score, was_shown, was_clicked, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            RETURNING id, user_id, content_id, content_type, score, was_shown, was_clicked, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content_id)
        .bind(kind.as_str())
        .bind(score)
        .bind(was_shown)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn mark_clicked(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        kind: ContentKind,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE recommendation_logs
            SET was_clicked = TRUE
            WHERE user_id = $1 AND content_id = $2 AND content_type = $3
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_clicked_by_id(&self, log_id: Uuid) -> Result<RecommendationLog> {
        sqlx::query_as::<_, RecommendationLog>(
            r#"
            UPDATE recommendation_logs
            SET was_clicked = TRUE
            WHERE id = $1
            RETURNING id, user_id, content_id, content_type, score, was_shown, was_clicked, created_at
            "#,
        )
        .bind(log_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recommendation log not found: {}", log_id)))
    }
}
