//! Database operations for talent challenges

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::{summary_columns, summary_from_row};
use crate::shared::social::ChallengeResponse;

fn challenge_select() -> String {
    format!(
        "SELECT ch.id, ch.title, ch.description, ch.ends_at, ch.created_at, {}, \
         (SELECT COUNT(*) FROM posts p WHERE p.challenge_id = ch.id) AS entry_count \
         FROM challenges ch JOIN users u ON u.id = ch.creator_id",
        summary_columns("u", "creator")
    )
}

fn challenge_from_row(row: &SqliteRow, now: DateTime<Utc>) -> Result<ChallengeResponse, sqlx::Error> {
    let ends_at: DateTime<Utc> = row.try_get("ends_at")?;
    Ok(ChallengeResponse {
        id: row.try_get("id")?,
        creator: summary_from_row(row, "creator")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        ends_at,
        entry_count: row.try_get("entry_count")?,
        is_active: ends_at > now,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_challenge(
    pool: &SqlitePool,
    creator_id: Uuid,
    title: &str,
    description: &str,
    ends_at: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO challenges (id, creator_id, title, description, ends_at, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(creator_id)
    .bind(title)
    .bind(description)
    .bind(ends_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn get_challenge(pool: &SqlitePool, id: Uuid) -> Result<Option<ChallengeResponse>, sqlx::Error> {
    let row = sqlx::query(&format!("{} WHERE ch.id = ?", challenge_select()))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let now = Utc::now();
    row.as_ref().map(|r| challenge_from_row(r, now)).transpose()
}

/// Challenges, newest first; only those still running when `active_only`
pub async fn list_challenges(pool: &SqlitePool, active_only: bool) -> Result<Vec<ChallengeResponse>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "{} ORDER BY ch.created_at DESC, ch.rowid DESC",
        challenge_select()
    ))
    .fetch_all(pool)
    .await?;

    // `ends_at` is compared in Rust: stored timestamps are text.
    let now = Utc::now();
    let challenges = rows
        .iter()
        .map(|r| challenge_from_row(r, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(challenges
        .into_iter()
        .filter(|c| !active_only || c.is_active)
        .collect())
}

/// End time of a challenge, if it exists
pub async fn challenge_ends_at(pool: &SqlitePool, id: Uuid) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    sqlx::query_scalar("SELECT ends_at FROM challenges WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}
