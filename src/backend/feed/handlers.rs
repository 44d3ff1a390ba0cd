//! Feed HTTP Handlers
//!
//! Posts, likes and comments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::db::{self, PostFilter, PostOrder};
use crate::backend::auth::users::user_exists;
use crate::backend::challenges::db::challenge_ends_at;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{notify, notify_once, NewNotification};
use crate::backend::server::state::AppState;
use crate::shared::social::{
    CommentRequest, CommentResponse, CreatePostRequest, FeedQuery, FeedResponse, LikeResponse,
    NotificationKind, PostResponse,
};
use crate::shared::validation::{check_text, MAX_COMMENT_LEN};

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Resolve `limit`/`offset` against the configured default page size
fn page(query: &FeedQuery, default_limit: u32) -> (i64, i64) {
    let limit = query.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
    (i64::from(limit), i64::from(query.offset.unwrap_or(0)))
}

async fn fetch_page(
    state: &AppState,
    viewer_id: Uuid,
    filter: PostFilter,
    query: &FeedQuery,
) -> Result<FeedResponse, BackendError> {
    let (limit, offset) = page(query, state.config.feed_page_size);
    // One extra row tells whether another page exists.
    let mut posts = db::list_posts(&state.db, viewer_id, filter, PostOrder::Newest, limit + 1, offset).await?;
    let has_more = posts.len() as i64 > limit;
    posts.truncate(limit as usize);
    Ok(FeedResponse { posts, has_more })
}

async fn require_post(state: &AppState, post_id: Uuid, viewer_id: Uuid) -> Result<PostResponse, BackendError> {
    db::get_post(&state.db, post_id, viewer_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))
}

/// GET /api/posts
pub async fn list_feed(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, BackendError> {
    let filter = PostFilter {
        scope: query.scope,
        media_type: query.media_type,
        ..PostFilter::default()
    };
    Ok(Json(fetch_page(&state, auth.user_id, filter, &query).await?))
}

/// GET /api/users/{id}/posts
pub async fn list_user_posts(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, BackendError> {
    if !user_exists(&state.db, user_id).await? {
        return Err(BackendError::not_found("User not found"));
    }

    let filter = PostFilter {
        author_id: Some(user_id),
        media_type: query.media_type,
        ..PostFilter::default()
    };
    Ok(Json(fetch_page(&state, auth.user_id, filter, &query).await?))
}

/// POST /api/posts
///
/// # Errors
///
/// * `400 Bad Request` - Invalid media/caption combination, or the challenge has ended
/// * `404 Not Found` - Unknown challenge
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), BackendError> {
    request.validate()?;

    if let Some(challenge_id) = request.challenge_id {
        let ends_at = challenge_ends_at(&state.db, challenge_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Challenge not found"))?;
        if ends_at <= Utc::now() {
            return Err(BackendError::validation("challenge_id", "this challenge has ended"));
        }
    }

    let media_url = request
        .media_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    let caption = request.caption.as_deref().unwrap_or("").trim();

    let post_id = db::create_post(
        &state.db,
        auth.user_id,
        request.media_type,
        media_url,
        caption,
        request.challenge_id,
    )
    .await?;

    tracing::info!("Post {} ({}) created by {}", post_id, request.media_type.as_str(), auth.username);

    let post = require_post(&state, post_id, auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, BackendError> {
    Ok(Json(require_post(&state, post_id, auth.user_id).await?))
}

/// DELETE /api/posts/{id}
///
/// Only the author may delete a post.
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let author_id = db::post_author(&state.db, post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    if author_id != auth.user_id {
        return Err(BackendError::forbidden("Only the author can delete this post"));
    }

    db::delete_post(&state.db, post_id).await?;
    tracing::info!("Post {} deleted by {}", post_id, auth.username);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/{id}/like
///
/// Toggles the caller's like. Only a user's first like of a post notifies
/// the author; unliking and liking again stays quiet.
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<LikeResponse>, BackendError> {
    let author_id = db::post_author(&state.db, post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    let (liked, like_count) = db::toggle_like(&state.db, post_id, auth.user_id).await?;

    if liked {
        let message = format!("{} liked your post", auth.username);
        notify_once(
            &state.db,
            &state.rooms,
            NewNotification {
                recipient_id: author_id,
                actor_id: Some(auth.user_id),
                kind: NotificationKind::Like,
                post_id: Some(post_id),
                message: &message,
            },
        )
        .await;
    }

    Ok(Json(LikeResponse { liked, like_count }))
}

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, BackendError> {
    if db::post_author(&state.db, post_id).await?.is_none() {
        return Err(BackendError::not_found("Post not found"));
    }
    Ok(Json(db::list_comments(&state.db, post_id).await?))
}

/// POST /api/posts/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), BackendError> {
    let text = request.text.trim();
    check_text("text", text, 1, MAX_COMMENT_LEN)?;

    let author_id = db::post_author(&state.db, post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    let comment = db::create_comment(&state.db, post_id, auth.user_id, text).await?;

    let message = format!("{} commented on your post", auth.username);
    notify(
        &state.db,
        &state.rooms,
        NewNotification {
            recipient_id: author_id,
            actor_id: Some(auth.user_id),
            kind: NotificationKind::Comment,
            post_id: Some(post_id),
            message: &message,
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/posts/{id}/comments/{comment_id}
///
/// Allowed for the comment's author and the post's author.
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BackendError> {
    let (comment_post_id, comment_author_id) = db::comment_owner(&state.db, comment_id)
        .await?
        .filter(|(comment_post_id, _)| *comment_post_id == post_id)
        .ok_or_else(|| BackendError::not_found("Comment not found"))?;

    let post_author_id = db::post_author(&state.db, comment_post_id).await?;
    if comment_author_id != auth.user_id && post_author_id != Some(auth.user_id) {
        return Err(BackendError::forbidden("Not allowed to delete this comment"));
    }

    db::delete_comment(&state.db, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<u32>, offset: Option<u32>) -> FeedQuery {
        FeedQuery {
            limit,
            offset,
            ..FeedQuery::default()
        }
    }

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(page(&query(None, None), 20), (20, 0));
        assert_eq!(page(&query(Some(500), Some(40)), 20), (100, 40));
        assert_eq!(page(&query(Some(0), None), 20), (1, 0));
    }
}
