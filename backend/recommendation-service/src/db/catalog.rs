use super::{category_table, content_column};
use crate::error::Result;
use crate::models::{CandidateFilter, CategoryTag, ChallengeCandidate, ContentKind, PostCandidate};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Read access to posts/challenges plus their category tags.
///
/// The content tables themselves are owned by the content layer; only the
/// category tables are written from here.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn categories_for(&self, kind: ContentKind, content_id: Uuid) -> Result<Vec<String>>;

    async fn tag(
        &self,
        kind: ContentKind,
        content_id: Uuid,
        category: &str,
        confidence: f64,
    ) -> Result<CategoryTag>;

    /// Un-deleted posts, newest first, narrowed by `filter`
    async fn post_candidates(&self, filter: &CandidateFilter) -> Result<Vec<PostCandidate>>;

    /// Un-deleted challenges, newest first, narrowed by `filter`
    async fn challenge_candidates(&self, filter: &CandidateFilter)
        -> Result<Vec<ChallengeCandidate>>;
}

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tags_for_many(
        &self,
        kind: ContentKind,
        content_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<CategoryTag>>> {
        if content_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            r#"
            SELECT {column}, category, confidence
            FROM {table}
            WHERE {column} = ANY($1)
            ORDER BY category
            "#,
            table = category_table(kind),
            column = content_column(kind),
        );

        let rows = sqlx::query_as::<_, (Uuid, String, f64)>(&sql)
            .bind(content_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut tags: HashMap<Uuid, Vec<CategoryTag>> = HashMap::new();
        for (content_id, category, confidence) in rows {
            tags.entry(content_id)
                .or_default()
                .push(CategoryTag { category, confidence });
        }

        Ok(tags)
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn categories_for(&self, kind: ContentKind, content_id: Uuid) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT category FROM {table} WHERE {column} = $1",
            table = category_table(kind),
            column = content_column(kind),
        );

        let categories = sqlx::query_scalar::<_, String>(&sql)
            .bind(content_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn tag(
        &self,
        kind: ContentKind,
        content_id: Uuid,
        category: &str,
        confidence: f64,
    ) -> Result<CategoryTag> {
        let sql = format!(
            r#"
            INSERT INTO {table} (id, {column}, category, confidence, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT ({column}, category) DO UPDATE SET confidence = EXCLUDED.confidence
            RETURNING category, confidence
            "#,
            table = category_table(kind),
            column = content_column(kind),
        );

        let tag = sqlx::query_as::<_, CategoryTag>(&sql)
            .bind(Uuid::new_v4())
            .bind(content_id)
            .bind(category)
            .bind(confidence)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(tag)
    }

    async fn post_candidates(&self, filter: &CandidateFilter) -> Result<Vec<PostCandidate>> {
        let mut posts = sqlx::query_as::<_, PostCandidate>(
            r#"
            SELECT p.id,
                   p.creator_id,
                   p.title,
                   p.description,
                   p.created_at,
                   COALESCE(p.media_urls, '{}')::TEXT[] AS media_urls,
                   COALESCE(p.like_count, 0)::BIGINT AS like_count,
                   COALESCE(p.comment_count, 0)::BIGINT AS comment_count
            FROM posts p
            WHERE p.is_deleted = FALSE
              AND (
                  cardinality($1::TEXT[]) = 0
                  OR EXISTS (
                      SELECT 1 FROM post_categories pc
                      WHERE pc.post_id = p.id AND pc.category = ANY($1)
                  )
              )
              AND NOT (p.id = ANY($2))
            ORDER BY p.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.categories)
        .bind(&filter.excluded_ids)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.tags_for_many(ContentKind::Post, &ids).await?;
        for post in &mut posts {
            post.categories = tags.remove(&post.id).unwrap_or_default();
        }

        Ok(posts)
    }

    async fn challenge_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<ChallengeCandidate>> {
        let mut challenges = sqlx::query_as::<_, ChallengeCandidate>(
            r#"
            SELECT c.id,
                   c.creator_id,
                   c.title,
                   c.description,
                   c.created_at,
                   COALESCE(c.media_urls, '{}')::TEXT[] AS media_urls,
                   COALESCE(c.participant_count, 0)::BIGINT AS participant_count
            FROM challenges c
            WHERE c.is_deleted = FALSE
              AND (
                  cardinality($1::TEXT[]) = 0
                  OR EXISTS (
                      SELECT 1 FROM challenge_categories cc
                      WHERE cc.challenge_id = c.id AND cc.category = ANY($1)
                  )
              )
              AND NOT (c.id = ANY($2))
            ORDER BY c.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.categories)
        .bind(&filter.excluded_ids)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = challenges.iter().map(|c| c.id).collect();
        let mut tags = self.tags_for_many(ContentKind::Challenge, &ids).await?;
        for challenge in &mut challenges {
            challenge.categories = tags.remove(&challenge.id).unwrap_or_default();
        }

        Ok(challenges)
    }
}
