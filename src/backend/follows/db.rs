//! Database operations for the follow graph
//!
//! One row per edge `(follower_id, followee_id)`. Both the "followers" and
//! the "following" lists are read from the same rows.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::{summary_columns, summary_from_row};
use crate::shared::social::UserSummary;

/// Create the edge; returns `false` if it already existed
pub async fn follow(pool: &SqlitePool, follower_id: Uuid, followee_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(follower_id)
    .bind(followee_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Remove the edge; returns `false` if there was none
pub async fn unfollow(pool: &SqlitePool, follower_id: Uuid, followee_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
        .bind(follower_id)
        .bind(followee_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn is_following(pool: &SqlitePool, follower_id: Uuid, followee_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = ?)")
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(pool)
        .await
}

pub async fn follower_count(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE followee_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn following_count(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Users following `user_id`, newest relationship first
pub async fn list_followers(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM follows f JOIN users u ON u.id = f.follower_id \
         WHERE f.followee_id = ? ORDER BY f.created_at DESC, f.rowid DESC",
        summary_columns("u", "user")
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(|row| summary_from_row(row, "user")).collect()
}

/// Users `user_id` follows, newest relationship first
pub async fn list_following(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM follows f JOIN users u ON u.id = f.followee_id \
         WHERE f.follower_id = ? ORDER BY f.created_at DESC, f.rowid DESC",
        summary_columns("u", "user")
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(|row| summary_from_row(row, "user")).collect()
}

/// IDs of every follower, used to fan out live-stream notifications
pub async fn follower_ids(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT follower_id FROM follows WHERE followee_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::load_database;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_follow_is_idempotent_and_symmetric() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let alice = create_user(&pool, "alice", "alice@example.com", "hash").await.unwrap();
        let bob = create_user(&pool, "bob", "bob@example.com", "hash").await.unwrap();

        assert!(follow(&pool, bob.id, alice.id).await.unwrap());
        assert!(!follow(&pool, bob.id, alice.id).await.unwrap());

        assert_eq!(follower_count(&pool, alice.id).await.unwrap(), 1);
        assert_eq!(following_count(&pool, bob.id).await.unwrap(), 1);
        assert_eq!(list_followers(&pool, alice.id).await.unwrap(), vec![bob.summary()]);
        assert_eq!(list_following(&pool, bob.id).await.unwrap(), vec![alice.summary()]);
        assert_eq!(follower_ids(&pool, alice.id).await.unwrap(), vec![bob.id]);
        assert!(is_following(&pool, bob.id, alice.id).await.unwrap());
        assert!(!is_following(&pool, alice.id, bob.id).await.unwrap());

        assert!(unfollow(&pool, bob.id, alice.id).await.unwrap());
        assert!(!unfollow(&pool, bob.id, alice.id).await.unwrap());
        assert_eq!(follower_count(&pool, alice.id).await.unwrap(), 0);
        assert!(list_following(&pool, bob.id).await.unwrap().is_empty());
    }
}
