/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations. Usernames and
 * emails are compared case-insensitively by the schema.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::shared::social::UserSummary;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// User email address
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Read a `UserSummary` from columns named `<prefix>_id`, `<prefix>_username`,
/// `<prefix>_display_name` and `<prefix>_avatar_url`.
pub fn summary_from_row(row: &SqliteRow, prefix: &str) -> Result<UserSummary, sqlx::Error> {
    Ok(UserSummary {
        id: row.try_get(format!("{}_id", prefix).as_str())?,
        username: row.try_get(format!("{}_username", prefix).as_str())?,
        display_name: row.try_get(format!("{}_display_name", prefix).as_str())?,
        avatar_url: row.try_get(format!("{}_avatar_url", prefix).as_str())?,
    })
}

/// Like `summary_from_row`, for a LEFT JOIN that may not have matched
pub fn optional_summary_from_row(row: &SqliteRow, prefix: &str) -> Result<Option<UserSummary>, sqlx::Error> {
    let id: Option<Uuid> = row.try_get(format!("{}_id", prefix).as_str())?;
    match id {
        Some(_) => summary_from_row(row, prefix).map(Some),
        None => Ok(None),
    }
}

/// Select list for a user summary joined under `alias`
pub fn summary_columns(alias: &str, prefix: &str) -> String {
    format!(
        "{a}.id AS {p}_id, {a}.username AS {p}_username, {a}.display_name AS {p}_display_name, {a}.avatar_url AS {p}_avatar_url",
        a = alias,
        p = prefix
    )
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, display_name, bio, avatar_url, created_at, updated_at";

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `username` - User's chosen username
/// * `email` - User email
/// * `password_hash` - Hashed password
///
/// # Returns
/// Created user or error; a taken username or email surfaces as a
/// unique-constraint violation
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, username, email, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get user by username
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Whether a user with this ID exists
pub async fn user_exists(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Update the editable profile fields
///
/// `None` leaves a field unchanged, `Some(None)` clears it.
pub async fn update_profile_fields(
    pool: &SqlitePool,
    id: Uuid,
    display_name: Option<Option<&str>>,
    bio: Option<Option<&str>>,
    avatar_url: Option<Option<&str>>,
) -> Result<User, sqlx::Error> {
    let user = get_user_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)?;

    let display_name = display_name.map_or(user.display_name, |v| v.map(str::to_string));
    let bio = bio.map_or(user.bio, |v| v.map(str::to_string));
    let avatar_url = avatar_url.map_or(user.avatar_url, |v| v.map(str::to_string));

    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET display_name = ?, bio = ?, avatar_url = ?, updated_at = ? \
         WHERE id = ? RETURNING {}",
        USER_COLUMNS
    ))
    .bind(display_name)
    .bind(bio)
    .bind(avatar_url)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(pool)
    .await
}
