//! Database operations for public profiles and user search

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::{summary_columns, summary_from_row};
use crate::shared::social::{ProfileResponse, UserSummary};

/// Maximum number of search results
pub const SEARCH_LIMIT: i64 = 20;

/// Public profile of `user_id` as seen by `viewer_id`
pub async fn get_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    viewer_id: Uuid,
) -> Result<Option<ProfileResponse>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.username, u.display_name, u.bio, u.avatar_url, u.created_at,
               (SELECT COUNT(*) FROM follows WHERE followee_id = u.id) AS followers,
               (SELECT COUNT(*) FROM follows WHERE follower_id = u.id) AS following,
               (SELECT COUNT(*) FROM posts WHERE author_id = u.id) AS posts,
               EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = u.id) AS is_following
        FROM users u
        WHERE u.id = ?
        "#,
    )
    .bind(viewer_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(r) = row else {
        return Ok(None);
    };

    Ok(Some(ProfileResponse {
        id: r.try_get("id")?,
        username: r.try_get("username")?,
        display_name: r.try_get("display_name")?,
        bio: r.try_get("bio")?,
        avatar_url: r.try_get("avatar_url")?,
        followers: r.try_get("followers")?,
        following: r.try_get("following")?,
        posts: r.try_get("posts")?,
        is_following: r.try_get("is_following")?,
        created_at: r.try_get("created_at")?,
    }))
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Users whose username or display name contains `query`, ignoring ASCII case.
/// Exact username matches sort first.
pub async fn search_users(pool: &SqlitePool, query: &str) -> Result<Vec<UserSummary>, sqlx::Error> {
    let pattern = like_pattern(query);
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users u \
         WHERE u.username LIKE ? ESCAPE '\\' OR u.display_name LIKE ? ESCAPE '\\' \
         ORDER BY (u.username = ?) DESC, u.username ASC LIMIT ?",
        summary_columns("u", "user")
    ))
    .bind(&pattern)
    .bind(&pattern)
    .bind(query)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    rows.iter().map(|row| summary_from_row(row, "user")).collect()
}
