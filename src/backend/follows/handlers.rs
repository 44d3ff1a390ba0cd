//! Follow HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::db;
use crate::backend::auth::users::user_exists;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{notify, NewNotification};
use crate::backend::server::state::AppState;
use crate::shared::social::{FollowResponse, NotificationKind, UserSummary};

async fn ensure_user(state: &AppState, user_id: Uuid) -> Result<(), BackendError> {
    if user_exists(&state.db, user_id).await? {
        Ok(())
    } else {
        Err(BackendError::not_found("User not found"))
    }
}

/// POST /api/users/{id}/follow
///
/// Following twice is a no-op. Only a new edge notifies the followee.
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(target_id): Path<Uuid>,
) -> Result<Json<FollowResponse>, BackendError> {
    if target_id == auth.user_id {
        return Err(BackendError::validation("id", "you cannot follow yourself"));
    }
    ensure_user(&state, target_id).await?;

    let created = db::follow(&state.db, auth.user_id, target_id).await?;
    if created {
        tracing::info!("{} followed {}", auth.user_id, target_id);
        let message = format!("{} started following you", auth.username);
        notify(
            &state.db,
            &state.rooms,
            NewNotification {
                recipient_id: target_id,
                actor_id: Some(auth.user_id),
                kind: NotificationKind::Follow,
                post_id: None,
                message: &message,
            },
        )
        .await;
    }

    let followers = db::follower_count(&state.db, target_id).await?;
    Ok(Json(FollowResponse {
        following: true,
        followers,
    }))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(target_id): Path<Uuid>,
) -> Result<Json<FollowResponse>, BackendError> {
    ensure_user(&state, target_id).await?;

    if db::unfollow(&state.db, auth.user_id, target_id).await? {
        tracing::info!("{} unfollowed {}", auth.user_id, target_id);
    }

    let followers = db::follower_count(&state.db, target_id).await?;
    Ok(Json(FollowResponse {
        following: false,
        followers,
    }))
}

/// GET /api/users/{id}/followers
pub async fn list_followers(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<UserSummary>>, BackendError> {
    ensure_user(&state, user_id).await?;
    Ok(Json(db::list_followers(&state.db, user_id).await?))
}

/// GET /api/users/{id}/following
pub async fn list_following(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<UserSummary>>, BackendError> {
    ensure_user(&state, user_id).await?;
    Ok(Json(db::list_following(&state.db, user_id).await?))
}
