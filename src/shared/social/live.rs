//! Live Stream Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::social::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartStreamRequest {
    pub title: String,
}

/// A live stream as listed to viewers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStreamResponse {
    pub id: Uuid,
    pub host: UserSummary,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub viewers: usize,
}
