//! Social Domain Types
//!
//! This module contains the request and response types of the JSON API:
//!
//! - `user` - Profiles, user summaries, follow responses
//! - `post` - Feed posts, likes and comments
//! - `ledger` - Donations, balances, supporters and withdrawals
//! - `notification` - Notification kinds and payloads
//! - `challenge` - Talent challenges and their entries
//! - `live` - Live stream listings
//!
//! # Usage
//!
//! ```rust
//! use talent_haven::shared::social::{CreatePostRequest, MediaType};
//! ```

pub mod user;
pub mod post;
pub mod ledger;
pub mod notification;
pub mod challenge;
pub mod live;

// Re-export all types
pub use user::{UserSummary, ProfileResponse, UpdateProfileRequest, SearchQuery, FollowResponse};
pub use post::{
    MediaType, CreatePostRequest, PostResponse, FeedScope, FeedQuery, FeedResponse,
    LikeResponse, CommentRequest, CommentResponse,
};
pub use ledger::{
    DonateRequest, DonationResponse, BalanceResponse, Supporter, SupportersResponse,
    WithdrawalRequest, WithdrawalStatus, WithdrawalResponse,
};
pub use notification::{
    NotificationKind, NotificationResponse, NotificationsQuery, UnreadCountResponse,
    MarkAllReadResponse,
};
pub use challenge::{
    CreateChallengeRequest, ChallengeResponse, ChallengeDetailResponse, ChallengesQuery,
};
pub use live::{StartStreamRequest, LiveStreamResponse};
