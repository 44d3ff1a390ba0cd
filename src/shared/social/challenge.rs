//! Talent Challenge Data Structures
//!
//! A challenge is a time-boxed prompt; posts submitted with its id become
//! entries and are ranked by likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::social::post::PostResponse;
use crate::shared::social::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChallengeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub id: Uuid,
    pub creator: UserSummary,
    pub title: String,
    pub description: String,
    pub ends_at: DateTime<Utc>,
    pub entry_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A challenge with its entries, most liked first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeDetailResponse {
    pub challenge: ChallengeResponse,
    pub entries: Vec<PostResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChallengesQuery {
    #[serde(default)]
    pub active: bool,
}
