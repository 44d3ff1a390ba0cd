//! User profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public part of a user shown next to posts, comments and notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Full public profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub followers: i64,
    pub following: i64,
    pub posts: i64,
    /// Whether the requesting user follows this profile
    pub is_following: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update. Absent fields are left unchanged; an empty
/// string clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Query string of `GET /api/users/search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Result of following or unfollowing a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowResponse {
    pub following: bool,
    /// Follower count of the target after the change
    pub followers: i64,
}
