pub mod content;
pub mod interest;
pub mod recommendation;

pub use content::{CategoryTag, ContentKind, Interaction, DEFAULT_INTERACTION_WEIGHT};
pub use interest::{InterestUpsert, UserInterest};
pub use recommendation::{
    CandidateFilter, ChallengeCandidate, ChallengeRecommendationRequest, PostCandidate,
    PostRecommendationRequest, Recommendable, RecommendationLog, RecommendationResponse,
};
