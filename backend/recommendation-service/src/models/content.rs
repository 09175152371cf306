use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Weight applied when an interaction type is not in the kind's table.
pub const DEFAULT_INTERACTION_WEIGHT: f64 = 1.0;

const POST_INTERACTION_WEIGHTS: &[(&str, f64)] = &[
    ("view", 1.0),
    ("like", 3.0),
    ("comment", 4.0),
    ("save", 5.0),
    ("share", 6.0),
];

const CHALLENGE_INTERACTION_WEIGHTS: &[(&str, f64)] = &[
    ("view", 1.0),
    ("join", 5.0),
    ("complete", 8.0),
    ("share", 6.0),
];

/// The two kinds of recommendable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Challenge,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Challenge => "challenge",
        }
    }

    fn weight_table(&self) -> &'static [(&'static str, f64)] {
        match self {
            ContentKind::Post => POST_INTERACTION_WEIGHTS,
            ContentKind::Challenge => CHALLENGE_INTERACTION_WEIGHTS,
        }
    }

    /// Interaction types accepted at the API boundary for this kind
    pub fn allowed_interactions(&self) -> impl Iterator<Item = &'static str> {
        self.weight_table().iter().map(|(name, _)| *name)
    }

    pub fn accepts_interaction(&self, interaction_type: &str) -> bool {
        self.allowed_interactions().any(|name| name == interaction_type)
    }

    /// Fixed weight for an interaction type; unknown types weigh
    /// [`DEFAULT_INTERACTION_WEIGHT`] instead of failing.
    pub fn interaction_weight(&self, interaction_type: &str) -> f64 {
        self.weight_table()
            .iter()
            .find(|(name, _)| *name == interaction_type)
            .map(|(_, weight)| *weight)
            .unwrap_or(DEFAULT_INTERACTION_WEIGHT)
    }

    /// Interaction type whose prior occurrences are excluded from recommendations
    pub fn exclusion_interaction(&self) -> &'static str {
        match self {
            ContentKind::Post => "view",
            ContentKind::Challenge => "join",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "post" | "posts" => Ok(ContentKind::Post),
            "challenge" | "challenges" => Ok(ContentKind::Challenge),
            other => Err(format!("unknown content kind: {}", other)),
        }
    }
}

/// Category assigned to a post or challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryTag {
    pub category: String,
    /// Stored for future ranking; not used when scoring
    pub confidence: f64,
}

/// One row of the append-only interaction log
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub interaction_type: String,
    pub interaction_weight: f64,
    pub created_at: DateTime<Utc>,
}
