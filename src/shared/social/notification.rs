//! Notification Data Structures

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::social::user::UserSummary;
use crate::shared::SharedError;

/// What triggered a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Donation,
    LiveStarted,
    Withdrawal,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::Donation => "donation",
            NotificationKind::LiveStarted => "live_started",
            NotificationKind::Withdrawal => "withdrawal",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(NotificationKind::Like),
            "comment" => Ok(NotificationKind::Comment),
            "follow" => Ok(NotificationKind::Follow),
            "donation" => Ok(NotificationKind::Donation),
            "live_started" => Ok(NotificationKind::LiveStarted),
            "withdrawal" => Ok(NotificationKind::Withdrawal),
            _ => Err(SharedError::validation("kind", format!("unknown notification kind '{}'", s))),
        }
    }
}

/// A notification as delivered to its recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    /// User who caused the notification; `None` for system notifications
    pub actor: Option<UserSummary>,
    pub post_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Query string of `GET /api/notifications`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_column_strings() {
        for kind in [NotificationKind::Like, NotificationKind::LiveStarted, NotificationKind::Withdrawal] {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
        }
        // column values are stored lowercase; no case folding here
        assert!("Like".parse::<NotificationKind>().is_err());
    }
}
