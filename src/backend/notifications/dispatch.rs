/**
 * Notification Dispatch
 *
 * Other modules call `notify` after a successful write (new follower, like,
 * comment, donation, live stream, withdrawal). The notification is
 * persisted first and then published as a `Notification` event to the
 * recipient's personal room, where open WebSocket connections and SSE
 * streams pick it up.
 *
 * Dispatch never fails the request that triggered it: errors are logged
 * and the caller carries on.
 *
 * `notify_once` is for actions a user can undo and redo (liking after an
 * unlike): the recipient hears about it the first time only.
 */

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::notifications::db;
use crate::backend::realtime::{Room, RoomRegistry};
use crate::shared::social::{NotificationKind, NotificationResponse};
use crate::shared::RealtimeEvent;

/// A notification about to be sent
#[derive(Debug, Clone)]
pub struct NewNotification<'a> {
    pub recipient_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub post_id: Option<Uuid>,
    pub message: &'a str,
}

/// Persist and publish a notification
///
/// Returns `None` when nothing was sent: the actor is the recipient, or
/// storing the notification failed.
pub async fn notify(
    pool: &SqlitePool,
    rooms: &RoomRegistry,
    notification: NewNotification<'_>,
) -> Option<NotificationResponse> {
    if notification.actor_id == Some(notification.recipient_id) {
        return None;
    }

    match deliver(pool, rooms, &notification).await {
        Ok(sent) => Some(sent),
        Err(e) => {
            tracing::error!(
                "Failed to send {} notification to {}: {}",
                notification.kind.as_str(),
                notification.recipient_id,
                e
            );
            None
        }
    }
}

/// Persist and publish a notification unless the same actor already sent
/// one of this kind about the same post
pub async fn notify_once(
    pool: &SqlitePool,
    rooms: &RoomRegistry,
    notification: NewNotification<'_>,
) -> Option<NotificationResponse> {
    let seen = db::notification_exists(
        pool,
        notification.recipient_id,
        notification.actor_id,
        notification.kind,
        notification.post_id,
    )
    .await;

    match seen {
        Ok(false) => notify(pool, rooms, notification).await,
        Ok(true) => None,
        Err(e) => {
            tracing::error!("Failed to check earlier {} notifications: {}", notification.kind.as_str(), e);
            None
        }
    }
}

async fn deliver(
    pool: &SqlitePool,
    rooms: &RoomRegistry,
    notification: &NewNotification<'_>,
) -> Result<NotificationResponse, BackendError> {
    let id = db::create_notification(
        pool,
        notification.recipient_id,
        notification.actor_id,
        notification.kind,
        notification.post_id,
        notification.message,
    )
    .await?;

    let (_, stored) = db::get_notification(pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Notification not found"))?;

    let event = RealtimeEvent::notification(serde_json::to_value(&stored)?);
    rooms.publish(Room::User(notification.recipient_id), event);

    Ok(stored)
}
