//! Database operations for notifications

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::{optional_summary_from_row, summary_columns};
use crate::shared::social::{NotificationKind, NotificationResponse};
use crate::shared::SharedError;

/// Maximum notifications returned by one listing
pub const MAX_NOTIFICATIONS: i64 = 100;

fn select_notifications() -> String {
    format!(
        "SELECT n.id, n.recipient_id, n.kind, n.post_id, n.message, n.is_read, n.created_at, {} \
         FROM notifications n LEFT JOIN users a ON a.id = n.actor_id",
        summary_columns("a", "actor")
    )
}

fn notification_from_row(row: &SqliteRow) -> Result<NotificationResponse, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    let kind: NotificationKind = kind.parse().map_err(|e: SharedError| sqlx::Error::Decode(e.into()))?;

    Ok(NotificationResponse {
        id: row.try_get("id")?,
        kind,
        actor: optional_summary_from_row(row, "actor")?,
        post_id: row.try_get("post_id")?,
        message: row.try_get("message")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a notification and return its ID
pub async fn create_notification(
    pool: &SqlitePool,
    recipient_id: Uuid,
    actor_id: Option<Uuid>,
    kind: NotificationKind,
    post_id: Option<Uuid>,
    message: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO notifications (id, recipient_id, actor_id, kind, post_id, message, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(id)
    .bind(recipient_id)
    .bind(actor_id)
    .bind(kind.as_str())
    .bind(post_id)
    .bind(message)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Whether `actor_id` already notified `recipient_id` of `kind` about `post_id`
pub async fn notification_exists(
    pool: &SqlitePool,
    recipient_id: Uuid,
    actor_id: Option<Uuid>,
    kind: NotificationKind,
    post_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    // `IS` compares NULL actor and post columns as equal.
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM notifications \
         WHERE recipient_id = ? AND actor_id IS ? AND kind = ? AND post_id IS ?)",
    )
    .bind(recipient_id)
    .bind(actor_id)
    .bind(kind.as_str())
    .bind(post_id)
    .fetch_one(pool)
    .await
}

/// Get a notification together with its recipient
pub async fn get_notification(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<(Uuid, NotificationResponse)>, sqlx::Error> {
    let row = sqlx::query(&format!("{} WHERE n.id = ?", select_notifications()))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(r) => Ok(Some((r.try_get("recipient_id")?, notification_from_row(&r)?))),
        None => Ok(None),
    }
}

/// Notifications of a user, newest first
pub async fn list_notifications(
    pool: &SqlitePool,
    recipient_id: Uuid,
    unread_only: bool,
) -> Result<Vec<NotificationResponse>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "{} WHERE n.recipient_id = ? AND (? = 0 OR n.is_read = 0) \
         ORDER BY n.created_at DESC, n.rowid DESC LIMIT ?",
        select_notifications()
    ))
    .bind(recipient_id)
    .bind(unread_only)
    .bind(MAX_NOTIFICATIONS)
    .fetch_all(pool)
    .await?;

    rows.iter().map(notification_from_row).collect()
}

pub async fn unread_count(pool: &SqlitePool, recipient_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = 0")
        .bind(recipient_id)
        .fetch_one(pool)
        .await
}

pub async fn mark_read(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark every unread notification of a user as read, returning how many changed
pub async fn mark_all_read(pool: &SqlitePool, recipient_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE recipient_id = ? AND is_read = 0")
        .bind(recipient_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::load_database;

    #[tokio::test]
    async fn test_create_list_and_mark_read() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let alice = create_user(&pool, "alice", "alice@example.com", "hash").await.unwrap();
        let bob = create_user(&pool, "bob", "bob@example.com", "hash").await.unwrap();

        let first = create_notification(&pool, alice.id, Some(bob.id), NotificationKind::Follow, None, "bob followed you")
            .await
            .unwrap();
        create_notification(&pool, alice.id, None, NotificationKind::Withdrawal, None, "Withdrawal completed")
            .await
            .unwrap();

        let all = list_notifications(&pool, alice.id, false).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, NotificationKind::Withdrawal);
        assert!(all[0].actor.is_none());
        assert_eq!(all[1].actor.as_ref().unwrap().username, "bob");
        assert_eq!(unread_count(&pool, alice.id).await.unwrap(), 2);

        mark_read(&pool, first).await.unwrap();
        let unread = list_notifications(&pool, alice.id, true).await.unwrap();
        assert_eq!(unread.len(), 1);

        assert_eq!(mark_all_read(&pool, alice.id).await.unwrap(), 1);
        assert_eq!(unread_count(&pool, alice.id).await.unwrap(), 0);

        let (recipient, notification) = get_notification(&pool, first).await.unwrap().unwrap();
        assert_eq!(recipient, alice.id);
        assert!(notification.is_read);
    }
}
