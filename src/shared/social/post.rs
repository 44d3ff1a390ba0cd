//! Feed Post Data Structures
//!
//! Posts are user-authored media or text items. Media bytes live in the
//! external media-storage service; a post only carries the URL.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::social::user::UserSummary;
use crate::shared::validation::{check_text, MAX_CAPTION_LEN};
use crate::shared::SharedError;

/// Kind of media a post carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Video,
    Audio,
    Image,
    /// Caption-only post without media
    Text,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Image => "image",
            MediaType::Text => "text",
        }
    }

    /// Whether posts of this kind must reference an uploaded file
    pub fn requires_media(&self) -> bool {
        !matches!(self, MediaType::Text)
    }
}

/// Request to publish a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub media_type: MediaType,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Submit the post as an entry to a challenge
    #[serde(default)]
    pub challenge_id: Option<Uuid>,
}

impl FromStr for MediaType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            "image" => Ok(MediaType::Image),
            "text" => Ok(MediaType::Text),
            _ => Err(SharedError::validation("media_type", format!("unknown media type '{}'", s))),
        }
    }
}

impl CreatePostRequest {
    /// Check the media/caption combination for the declared media type.
    pub fn validate(&self) -> Result<(), SharedError> {
        let caption = self.caption.as_deref().unwrap_or("");
        let media_url = self.media_url.as_deref().map(str::trim).filter(|u| !u.is_empty());

        if self.media_type.requires_media() {
            let url = media_url.ok_or_else(|| {
                SharedError::validation("media_url", format!("{} posts need a media URL", self.media_type.as_str()))
            })?;
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(SharedError::validation("media_url", "must be an http(s) URL"));
            }
            check_text("caption", caption, 0, MAX_CAPTION_LEN)
        } else {
            if media_url.is_some() {
                return Err(SharedError::validation("media_url", "text posts cannot carry media"));
            }
            check_text("caption", caption, 1, MAX_CAPTION_LEN)
        }
    }
}

/// Post as rendered in the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author: UserSummary,
    pub media_type: MediaType,
    pub media_url: Option<String>,
    pub caption: String,
    pub challenge_id: Option<Uuid>,
    pub like_count: i64,
    pub comment_count: i64,
    pub donation_total_cents: i64,
    /// Whether the requesting user liked this post
    pub liked_by_me: bool,
    pub created_at: DateTime<Utc>,
}

/// Which posts the feed draws from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedScope {
    #[default]
    All,
    /// Posts by accounts the caller follows, plus the caller's own
    Following,
}

/// Query string of `GET /api/posts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub scope: FeedScope,
    pub media_type: Option<MediaType>,
}

/// A page of posts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<PostResponse>,
    pub has_more: bool,
}

/// Result of toggling a like
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Request to comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// A comment under a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: UserSummary,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(media_type: MediaType, media_url: Option<&str>, caption: Option<&str>) -> CreatePostRequest {
        CreatePostRequest {
            media_type,
            media_url: media_url.map(str::to_string),
            caption: caption.map(str::to_string),
            challenge_id: None,
        }
    }

    #[test]
    fn test_text_post_needs_caption() {
        assert!(request(MediaType::Text, None, Some("hello")).validate().is_ok());
        assert!(request(MediaType::Text, None, None).validate().is_err());
        assert!(request(MediaType::Text, Some("https://cdn/x.mp4"), Some("hi")).validate().is_err());
    }

    #[test]
    fn test_media_post_needs_url() {
        assert!(request(MediaType::Video, Some("https://cdn.example.com/v.mp4"), None).validate().is_ok());
        assert!(request(MediaType::Audio, None, Some("song")).validate().is_err());
        assert!(request(MediaType::Image, Some("ftp://host/x.png"), None).validate().is_err());
        assert!(request(MediaType::Video, Some("   "), None).validate().is_err());
    }

    #[test]
    fn test_caption_length_limit() {
        let long = "x".repeat(MAX_CAPTION_LEN + 1);
        assert!(request(MediaType::Text, None, Some(&long)).validate().is_err());
    }

    #[test]
    fn test_media_type_strings() {
        for kind in [MediaType::Video, MediaType::Audio, MediaType::Image, MediaType::Text] {
            assert_eq!(kind.as_str().parse::<MediaType>(), Ok(kind));
        }
        assert_eq!("VIDEO".parse::<MediaType>(), Ok(MediaType::Video));
        assert!("gif".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_feed_query_defaults_to_all() {
        let query: FeedQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.scope, FeedScope::All);
        assert!(query.limit.is_none());
    }
}
