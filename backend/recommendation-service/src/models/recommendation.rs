use super::CategoryTag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

fn default_limit() -> i64 {
    10
}

fn default_true() -> bool {
    true
}

/// Request for personalized post recommendations
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PostRecommendationRequest {
    pub user_id: Uuid,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
    /// Accepted for API compatibility, does not change the candidate set
    #[serde(default = "default_true")]
    pub include_following: bool,
    /// Accepted for API compatibility, does not change the candidate set
    #[serde(default = "default_true")]
    pub include_global: bool,
    #[serde(default = "default_true")]
    pub exclude_seen: bool,
}

impl PostRecommendationRequest {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            limit: default_limit(),
            offset: 0,
            include_following: true,
            include_global: true,
            exclude_seen: true,
        }
    }
}

/// Request for personalized challenge recommendations
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ChallengeRecommendationRequest {
    pub user_id: Uuid,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
    /// Accepted for API compatibility, does not change the candidate set
    #[serde(default = "default_true")]
    pub include_followed_creators: bool,
    /// Accepted for API compatibility, does not change the candidate set
    #[serde(default = "default_true")]
    pub include_global: bool,
    #[serde(default = "default_true")]
    pub exclude_joined: bool,
}

impl ChallengeRecommendationRequest {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            limit: default_limit(),
            offset: 0,
            include_followed_creators: true,
            include_global: true,
            exclude_joined: true,
        }
    }
}

/// Page of recommended items.
///
/// `total` is the number of items on this page, not the size of the
/// filtered candidate set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Anything the scorer can surface and log
pub trait Recommendable {
    fn content_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostCandidate {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub media_urls: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    #[sqlx(skip)]
    pub categories: Vec<CategoryTag>,
}

impl Recommendable for PostCandidate {
    fn content_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChallengeCandidate {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub media_urls: Vec<String>,
    pub participant_count: i64,
    #[sqlx(skip)]
    pub categories: Vec<CategoryTag>,
}

impl Recommendable for ChallengeCandidate {
    fn content_id(&self) -> Uuid {
        self.id
    }
}

/// Filter handed to the catalog when fetching a page of candidates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    /// Empty means no category restriction
    pub categories: Vec<String>,
    pub excluded_ids: Vec<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Audit row for an item surfaced to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub content_type: String,
    pub score: f64,
    pub was_shown: bool,
    pub was_clicked: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_request_defaults() {
        let user_id = Uuid::new_v4();
        let req: PostRecommendationRequest =
            serde_json::from_value(serde_json::json!({ "user_id": user_id })).unwrap();
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset, 0);
        assert!(req.exclude_seen);
        assert!(req.include_following);
        assert!(req.include_global);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_challenge_request_defaults() {
        let user_id = Uuid::new_v4();
        let req: ChallengeRecommendationRequest =
            serde_json::from_value(serde_json::json!({ "user_id": user_id, "limit": 5 })).unwrap();
        assert_eq!(req.limit, 5);
        assert!(req.exclude_joined);
        assert!(req.include_followed_creators);
    }

    #[test]
    fn test_limit_bounds() {
        let mut req = PostRecommendationRequest::for_user(Uuid::new_v4());
        req.limit = 0;
        assert!(req.validate().is_err());
        req.limit = 101;
        assert!(req.validate().is_err());
        req.limit = 100;
        req.offset = -1;
        assert!(req.validate().is_err());
    }
}
