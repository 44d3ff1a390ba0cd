//! Notification HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::social::{
    MarkAllReadResponse, NotificationResponse, NotificationsQuery, UnreadCountResponse,
};

/// GET /api/notifications
pub async fn list_notifications(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<NotificationResponse>>, BackendError> {
    let notifications = db::list_notifications(&pool, auth.user_id, query.unread_only).await?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
) -> Result<Json<UnreadCountResponse>, BackendError> {
    let unread = db::unread_count(&pool, auth.user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// PATCH /api/notifications/{id}/read
///
/// Only the recipient may mark a notification as read.
pub async fn mark_read(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, BackendError> {
    let (recipient_id, mut notification) = db::get_notification(&pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Notification not found"))?;

    if recipient_id != auth.user_id {
        return Err(BackendError::forbidden("Not your notification"));
    }

    if !notification.is_read {
        db::mark_read(&pool, id).await?;
        notification.is_read = true;
    }

    Ok(Json(notification))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
) -> Result<Json<MarkAllReadResponse>, BackendError> {
    let updated = db::mark_all_read(&pool, auth.user_id).await?;
    tracing::debug!("Marked {} notifications read for {}", updated, auth.user_id);
    Ok(Json(MarkAllReadResponse { updated }))
}
