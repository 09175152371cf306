//! In-memory repositories for unit and handler tests.

use crate::db::{
    CatalogRepository, InteractionRepository, InterestRepository, RecommendationLogRepository,
    Repositories,
};
use crate::error::{AppError, Result};
use crate::models::{
    CandidateFilter, CategoryTag, ChallengeCandidate, ContentKind, Interaction, PostCandidate,
    InterestUpsert, RecommendationLog, UserInterest,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct State {
    interests: Vec<UserInterest>,
    interactions: Vec<(ContentKind, Interaction)>,
    logs: Vec<RecommendationLog>,
    tags: Vec<(ContentKind, Uuid, CategoryTag)>,
    posts: Vec<(PostCandidate, bool)>,
    challenges: Vec<(ChallengeCandidate, bool)>,
    failing_interest_categories: HashSet<String>,
    fail_log_writes: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            interests: self.clone(),
            interactions: self.clone(),
            logs: self.clone(),
            catalog: self.clone(),
        }
    }

    /// Seed a post created `age_minutes` ago with the given categories
    pub fn add_post(&self, age_minutes: i64, categories: &[&str]) -> Uuid {
        self.add_post_with_state(age_minutes, categories, false)
    }

    pub fn add_deleted_post(&self, age_minutes: i64, categories: &[&str]) -> Uuid {
        self.add_post_with_state(age_minutes, categories, true)
    }

    fn add_post_with_state(&self, age_minutes: i64, categories: &[&str], deleted: bool) -> Uuid {
        let id = Uuid::new_v4();
        let post = PostCandidate {
            id,
            creator_id: Uuid::new_v4(),
            title: Some(format!("post {}", age_minutes)),
            description: None,
            created_at: minutes_ago(age_minutes),
            media_urls: vec![],
            like_count: 0,
            comment_count: 0,
            categories: vec![],
        };
        let mut state = self.state();
        state.posts.push((post, deleted));
        for category in categories {
            state
                .tags
                .push((ContentKind::Post, id, tag(category)));
        }
        id
    }

    pub fn add_challenge(&self, age_minutes: i64, categories: &[&str]) -> Uuid {
        let id = Uuid::new_v4();
        let challenge = ChallengeCandidate {
            id,
            creator_id: Uuid::new_v4(),
            title: Some(format!("challenge {}", age_minutes)),
            description: None,
            created_at: minutes_ago(age_minutes),
            media_urls: vec![],
            participant_count: 0,
            categories: vec![],
        };
        let mut state = self.state();
        state.challenges.push((challenge, false));
        for category in categories {
            state
                .tags
                .push((ContentKind::Challenge, id, tag(category)));
        }
        id
    }

    pub fn set_interest(&self, user_id: Uuid, category: &str, weight: f64) {
        let now = Utc::now();
        self.state().interests.push(UserInterest {
            id: Uuid::new_v4(),
            user_id,
            category: category.to_string(),
            weight,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn interest_weight(&self, user_id: Uuid, category: &str) -> Option<f64> {
        self.state()
            .interests
            .iter()
            .find(|i| i.user_id == user_id && i.category == category)
            .map(|i| i.weight)
    }

    pub fn interests_for(&self, user_id: Uuid) -> usize {
        self.state()
            .interests
            .iter()
            .filter(|i| i.user_id == user_id)
            .count()
    }

    pub fn interactions(&self, kind: ContentKind) -> Vec<Interaction> {
        self.state()
            .interactions
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, i)| i.clone())
            .collect()
    }

    pub fn logs(&self) -> Vec<RecommendationLog> {
        self.state().logs.clone()
    }

    pub fn fail_interest_writes_for(&self, category: &str) {
        self.state()
            .failing_interest_categories
            .insert(category.to_string());
    }

    pub fn fail_log_writes(&self) {
        self.state().fail_log_writes = true;
    }
}

fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

fn tag(category: &str) -> CategoryTag {
    CategoryTag {
        category: category.to_string(),
        confidence: 1.0,
    }
}

fn injected(what: &str) -> AppError {
    AppError::Internal(format!("injected failure: {}", what))
}

fn page<T: Clone>(items: Vec<T>, filter: &CandidateFilter) -> Vec<T> {
    items
        .into_iter()
        .skip(filter.offset.max(0) as usize)
        .take(filter.limit.max(0) as usize)
        .collect()
}

impl State {
    fn tags_for(&self, kind: ContentKind, content_id: Uuid) -> Vec<CategoryTag> {
        self.tags
            .iter()
            .filter(|(k, id, _)| *k == kind && *id == content_id)
            .map(|(_, _, t)| t.clone())
            .collect()
    }

    fn passes(&self, kind: ContentKind, content_id: Uuid, filter: &CandidateFilter) -> bool {
        if filter.excluded_ids.contains(&content_id) {
            return false;
        }
        filter.categories.is_empty()
            || self
                .tags_for(kind, content_id)
                .iter()
                .any(|t| filter.categories.contains(&t.category))
    }
}

#[async_trait]
impl InterestRepository for InMemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserInterest>> {
        let mut interests: Vec<UserInterest> = self
            .state()
            .interests
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        interests.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.category.cmp(&b.category))
        });
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
        let mut state = self.state();
        if state.failing_interest_categories.contains(category) {
            return Err(injected(category));
        }
        let now = Utc::now();

        if let Some(interest) = state
            .interests
            .iter_mut()
            .find(|i| i.user_id == user_id && i.category == category)
        {
            interest.weight = (interest.weight + increment).min(ceiling);
            interest.updated_at = now;
            return Ok(InterestUpsert {
                interest: interest.clone(),
                created: false,
            });
        }

        let interest = UserInterest {
            id: Uuid::new_v4(),
            user_id,
            category: category.to_string(),
            weight: bootstrap,
            created_at: now,
            updated_at: now,
        };
        state.interests.push(interest.clone());
        Ok(InterestUpsert {
            interest,
            created: true,
        })
    }
}

#[async_trait]
impl InteractionRepository for InMemoryStore {
    async fn insert(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: &str,
        interaction_weight: f64,
    ) -> Result<Interaction> {
        let interaction = Interaction {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            interaction_type: interaction_type.to_string(),
            interaction_weight,
            created_at: Utc::now(),
        };
        self.state().interactions.push((kind, interaction.clone()));
        Ok(interaction)
    }

    async fn content_ids_with_interaction(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        interaction_type: &str,
    ) -> Result<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self
            .state()
            .interactions
            .iter()
            .filter(|(k, i)| {
                *k == kind && i.user_id == user_id && i.interaction_type == interaction_type
            })
            .map(|(_, i)| i.content_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl RecommendationLogRepository for InMemoryStore {
    async fn insert(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        kind: ContentKind,
        score: f64,
        was_shown: bool,
    ) -> Result<RecommendationLog> {
        let mut state = self.state();
        if state.fail_log_writes {
            return Err(injected("recommendation log"));
        }
        let log = RecommendationLog {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            content_type: kind.as_str().to_string(),
            score,
            was_shown,
            was_clicked: false,
            created_at: Utc::now(),
        };
        state.logs.push(log.clone());
        Ok(log)
    }

    async fn mark_clicked(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        kind: ContentKind,
    ) -> Result<u64> {
        let mut touched = 0;
        for log in self.state().logs.iter_mut().filter(|l| {
            l.user_id == user_id && l.content_id == content_id && l.content_type == kind.as_str()
        }) {
            log.was_clicked = true;
            touched += 1;
        }
        Ok(touched)
    }

    async fn mark_clicked_by_id(&self, log_id: Uuid) -> Result<RecommendationLog> {
        let mut state = self.state();
        let log = state
            .logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| AppError::NotFound(format!("Recommendation log not found: {}", log_id)))?;
        log.was_clicked = true;
        Ok(log.clone())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn categories_for(&self, kind: ContentKind, content_id: Uuid) -> Result<Vec<String>> {
        Ok(self
            .state()
            .tags_for(kind, content_id)
            .into_iter()
            .map(|t| t.category)
            .collect())
    }

    async fn tag(
        &self,
        kind: ContentKind,
        content_id: Uuid,
        category: &str,
        confidence: f64,
    ) -> Result<CategoryTag> {
        let mut state = self.state();
        if let Some((_, _, existing)) = state
            .tags
            .iter_mut()
            .find(|(k, id, t)| *k == kind && *id == content_id && t.category == category)
        {
            existing.confidence = confidence;
            return Ok(existing.clone());
        }
        let tag = CategoryTag {
            category: category.to_string(),
            confidence,
        };
        state.tags.push((kind, content_id, tag.clone()));
        Ok(tag)
    }

    async fn post_candidates(&self, filter: &CandidateFilter) -> Result<Vec<PostCandidate>> {
        let state = self.state();
        let mut posts: Vec<PostCandidate> = state
            .posts
            .iter()
            .filter(|(p, deleted)| !deleted && state.passes(ContentKind::Post, p.id, filter))
            .map(|(p, _)| {
                let mut post = p.clone();
                post.categories = state.tags_for(ContentKind::Post, p.id);
                post
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(posts, filter))
    }

    async fn challenge_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<ChallengeCandidate>> {
        let state = self.state();
        let mut challenges: Vec<ChallengeCandidate> = state
            .challenges
            .iter()
            .filter(|(c, deleted)| !deleted && state.passes(ContentKind::Challenge, c.id, filter))
            .map(|(c, _)| {
                let mut challenge = c.clone();
                challenge.categories = state.tags_for(ContentKind::Challenge, c.id);
                challenge
            })
            .collect();
        challenges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(challenges, filter))
    }
}
