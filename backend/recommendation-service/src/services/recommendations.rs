//! Recommendation scorer.
//!
//! Candidates are narrowed by the user's interest categories (no filter when
//! the user has none), optionally stripped of already seen/joined items, and
//! returned newest first. Every item currently scores a flat 1.0; each
//! surfaced item is logged so later interactions can be attributed to it.

use crate::db::{CatalogRepository, InteractionRepository, InterestRepository, RecommendationLogRepository};
use crate::error::Result;
use crate::metrics::{
    RECOMMENDATION_DURATION_SECONDS, RECOMMENDATION_REQUESTS_TOTAL, RECOMMENDED_ITEMS_TOTAL,
};
use crate::models::{
    CandidateFilter, ChallengeCandidate, ChallengeRecommendationRequest, ContentKind,
    PostCandidate, PostRecommendationRequest, Recommendable, RecommendationResponse,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Score assigned to every surfaced item until a ranking model exists
pub const PLACEHOLDER_SCORE: f64 = 1.0;

pub struct RecommendationScorer {
    interests: Arc<dyn InterestRepository>,
    interactions: Arc<dyn InteractionRepository>,
    logs: Arc<dyn RecommendationLogRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl RecommendationScorer {
    pub fn new(
        interests: Arc<dyn InterestRepository>,
        interactions: Arc<dyn InteractionRepository>,
        logs: Arc<dyn RecommendationLogRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            interests,
            interactions,
            logs,
            catalog,
        }
    }

    pub async fn get_post_recommendations(
        &self,
        request: &PostRecommendationRequest,
    ) -> Result<RecommendationResponse<PostCandidate>> {
        request.validate()?;
        let kind = ContentKind::Post;
        let _timer = RECOMMENDATION_DURATION_SECONDS
            .with_label_values(&[kind.as_str()])
            .start_timer();
        RECOMMENDATION_REQUESTS_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();

        let filter = self
            .build_filter(
                kind,
                request.user_id,
                request.exclude_seen,
                request.limit,
                request.offset,
            )
            .await?;
        let items = self.catalog.post_candidates(&filter).await?;

        self.finish(kind, request.user_id, items).await
    }

    pub async fn get_challenge_recommendations(
        &self,
        request: &ChallengeRecommendationRequest,
    ) -> Result<RecommendationResponse<ChallengeCandidate>> {
        request.validate()?;
        let kind = ContentKind::Challenge;
        let _timer = RECOMMENDATION_DURATION_SECONDS
            .with_label_values(&[kind.as_str()])
            .start_timer();
        RECOMMENDATION_REQUESTS_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();

        let filter = self
            .build_filter(
                kind,
                request.user_id,
                request.exclude_joined,
                request.limit,
                request.offset,
            )
            .await?;
        let items = self.catalog.challenge_candidates(&filter).await?;

        self.finish(kind, request.user_id, items).await
    }

    async fn build_filter(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        exclude_prior: bool,
        limit: i64,
        offset: i64,
    ) -> Result<CandidateFilter> {
        let categories: Vec<String> = self
            .interests
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|interest| interest.category)
            .collect();

        let excluded_ids = if exclude_prior {
            self.interactions
                .content_ids_with_interaction(kind, user_id, kind.exclusion_interaction())
                .await?
        } else {
            Vec::new()
        };

        debug!(
            user_id = %user_id,
            kind = %kind,
            categories = categories.len(),
            excluded = excluded_ids.len(),
            "Candidate filter built"
        );

        Ok(CandidateFilter {
            categories,
            excluded_ids,
            limit,
            offset,
        })
    }

    async fn finish<T: Recommendable>(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        items: Vec<T>,
    ) -> Result<RecommendationResponse<T>> {
        for item in &items {
            self.logs
                .insert(user_id, item.content_id(), kind, PLACEHOLDER_SCORE, true)
                .await?;
        }

        RECOMMENDED_ITEMS_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc_by(items.len() as u64);
        info!(user_id = %user_id, kind = %kind, count = items.len(), "Recommendations served");

        Ok(RecommendationResponse {
            total: items.len(),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::{InteractionRecorder, InterestUpdater};
    use crate::testing::InMemoryStore;

    fn scorer(store: &Arc<InMemoryStore>) -> RecommendationScorer {
        RecommendationScorer::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    fn recorder(store: &Arc<InMemoryStore>) -> InteractionRecorder {
        InteractionRecorder::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(InterestUpdater::new(store.clone())),
        )
    }

    #[tokio::test]
    async fn test_no_interests_returns_newest_undeleted() {
        let store = InMemoryStore::new();
        let oldest = store.add_post(30, &["music"]);
        let newest = store.add_post(1, &[]);
        store.add_deleted_post(0, &["music"]);
        let middle = store.add_post(10, &["fitness"]);

        let mut request = PostRecommendationRequest::for_user(Uuid::new_v4());
        request.limit = 2;
        let response = scorer(&store).get_post_recommendations(&request).await.unwrap();

        let ids: Vec<Uuid> = response.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newest, middle]);
        assert_eq!(response.total, 2);

        request.offset = 2;
        let response = scorer(&store).get_post_recommendations(&request).await.unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].id, oldest);
    }

    #[tokio::test]
    async fn test_interests_restrict_categories() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        store.set_interest(user_id, "fitness", 2.0);
        let fit_a = store.add_post(3, &["fitness", "outdoors"]);
        store.add_post(2, &["cooking"]);
        let fit_b = store.add_post(1, &["fitness"]);

        let response = scorer(&store)
            .get_post_recommendations(&PostRecommendationRequest::for_user(user_id))
            .await
            .unwrap();

        let ids: Vec<Uuid> = response.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![fit_b, fit_a]);
        assert!(response
            .items
            .iter()
            .all(|p| p.categories.iter().any(|t| t.category == "fitness")));
    }

    #[tokio::test]
    async fn test_exclude_seen_toggle() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let seen = store.add_post(2, &[]);
        let liked = store.add_post(1, &[]);
        InteractionRepository::insert(&*store, ContentKind::Post, user_id, seen, "view", 1.0)
            .await
            .unwrap();
        InteractionRepository::insert(&*store, ContentKind::Post, user_id, liked, "like", 3.0)
            .await
            .unwrap();

        let mut request = PostRecommendationRequest::for_user(user_id);
        let response = scorer(&store).get_post_recommendations(&request).await.unwrap();
        let ids: Vec<Uuid> = response.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![liked]);

        request.exclude_seen = false;
        let response = scorer(&store).get_post_recommendations(&request).await.unwrap();
        assert_eq!(response.items.len(), 2);
    }

    #[tokio::test]
    async fn test_exclude_joined_uses_join_only() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let joined = store.add_challenge(2, &[]);
        let viewed = store.add_challenge(1, &[]);
        InteractionRepository::insert(&*store, ContentKind::Challenge, user_id, joined, "join", 5.0)
            .await
            .unwrap();
        InteractionRepository::insert(&*store, ContentKind::Challenge, user_id, viewed, "view", 1.0)
            .await
            .unwrap();

        let response = scorer(&store)
            .get_challenge_recommendations(&ChallengeRecommendationRequest::for_user(user_id))
            .await
            .unwrap();

        let ids: Vec<Uuid> = response.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![viewed]);
    }

    #[tokio::test]
    async fn test_challenge_interests_restrict_categories() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        store.set_interest(user_id, "running", 1.0);
        store.set_interest(user_id, "reading", 0.4);
        let run = store.add_challenge(3, &["running"]);
        store.add_challenge(2, &["cooking"]);
        store.add_challenge(2, &[]);
        let read = store.add_challenge(1, &["reading", "cooking"]);

        let response = scorer(&store)
            .get_challenge_recommendations(&ChallengeRecommendationRequest::for_user(user_id))
            .await
            .unwrap();

        let ids: Vec<Uuid> = response.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![read, run]);
        assert_eq!(response.total, 2);
        assert!(store.logs().iter().all(|l| l.content_type == "challenge"));
    }

    #[tokio::test]
    async fn test_exclude_joined_disabled_keeps_joined() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let joined = store.add_challenge(2, &[]);
        let fresh = store.add_challenge(1, &[]);
        InteractionRepository::insert(&*store, ContentKind::Challenge, user_id, joined, "join", 5.0)
            .await
            .unwrap();

        let mut request = ChallengeRecommendationRequest::for_user(user_id);
        request.exclude_joined = false;
        let response = scorer(&store)
            .get_challenge_recommendations(&request)
            .await
            .unwrap();

        let ids: Vec<Uuid> = response.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![fresh, joined]);
    }

    #[tokio::test]
    async fn test_served_items_logged_then_clicked() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let first = store.add_post(2, &["art"]);
        let second = store.add_post(1, &["art"]);

        let response = scorer(&store)
            .get_post_recommendations(&PostRecommendationRequest::for_user(user_id))
            .await
            .unwrap();
        assert_eq!(response.items.len(), 2);

        let logs = store.logs();
        assert_eq!(logs.len(), 2);
        for log in &logs {
            assert!(log.was_shown);
            assert!(!log.was_clicked);
            assert_eq!(log.score, PLACEHOLDER_SCORE);
            assert_eq!(log.content_type, "post");
            assert!(log.content_id == first || log.content_id == second);
        }

        recorder(&store)
            .record_post_interaction(user_id, first, "like")
            .await
            .unwrap();

        for log in store.logs() {
            assert_eq!(log.was_clicked, log.content_id == first);
        }
    }

    #[tokio::test]
    async fn test_log_failure_propagates() {
        let store = InMemoryStore::new();
        store.add_post(1, &[]);
        store.fail_log_writes();

        let result = scorer(&store)
            .get_post_recommendations(&PostRecommendationRequest::for_user(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_invalid_limit_rejected() {
        let store = InMemoryStore::new();
        let mut request = ChallengeRecommendationRequest::for_user(Uuid::new_v4());
        request.limit = 0;

        let result = scorer(&store).get_challenge_recommendations(&request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.logs().is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let store = InMemoryStore::new();
        let response = scorer(&store)
            .get_challenge_recommendations(&ChallengeRecommendationRequest::for_user(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.total, 0);
    }
}
