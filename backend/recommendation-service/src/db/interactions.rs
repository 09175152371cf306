use super::{content_column, interaction_table};
use crate::error::Result;
use crate::models::{ContentKind, Interaction};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Append-only interaction log; repeated interactions are separate rows.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    async fn insert(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: &str,
        interaction_weight: f64,
    ) -> Result<Interaction>;

    /// Distinct content ids the user has an interaction of this type on
    async fn content_ids_with_interaction(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        interaction_type: &str,
    ) -> Result<Vec<Uuid>>;
}

pub struct PgInteractionRepository {
    pool: PgPool,
}

impl PgInteractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionRepository for PgInteractionRepository {
    async fn insert(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: &str,
        interaction_weight: f64,
    ) -> Result<Interaction> {
        let sql = format!(
            r#"
            INSERT INTO {table} (id, user_id, {column}, interaction_type, interaction_weight, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, {column} AS content_id, interaction_type, interaction_weight, created_at
            "#,
            table = interaction_table(kind),
            column = content_column(kind),
        );

        let interaction = sqlx::query_as::<_, Interaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(content_id)
            .bind(interaction_type)
            .bind(interaction_weight)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(interaction)
    }

    async fn content_ids_with_interaction(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        interaction_type: &str,
    ) -> Result<Vec<Uuid>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM {table} WHERE user_id = $1 AND interaction_type = $2",
            table = interaction_table(kind),
            column = content_column(kind),
        );

        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(user_id)
            .bind(interaction_type)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}
