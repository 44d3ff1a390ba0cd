//! Database operations for posts, likes and comments
//!
//! Post queries compute like, comment and donation aggregates per row so a
//! feed page is a single query.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::{summary_columns, summary_from_row};
use crate::shared::social::{CommentResponse, FeedScope, MediaType, PostResponse};
use crate::shared::SharedError;

/// Filters for a page of posts
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub scope: FeedScope,
    pub media_type: Option<MediaType>,
    pub author_id: Option<Uuid>,
    pub challenge_id: Option<Uuid>,
}

/// Order of a page of posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    Newest,
    /// Challenge leaderboard: most likes first, earliest entry wins ties
    MostLiked,
}

fn post_select(viewer_id: Uuid) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT p.id, p.media_type, p.media_url, p.caption, p.challenge_id, p.created_at, {}, \
         (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count, \
         (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count, \
         (SELECT COALESCE(SUM(d.amount_cents), 0) FROM donations d WHERE d.post_id = p.id) AS donation_total_cents, \
         EXISTS(SELECT 1 FROM post_likes l WHERE l.post_id = p.id AND l.user_id = ",
        summary_columns("u", "author")
    ));
    qb.push_bind(viewer_id);
    qb.push(") AS liked_by_me FROM posts p JOIN users u ON u.id = p.author_id");
    qb
}

fn post_from_row(row: &SqliteRow) -> Result<PostResponse, sqlx::Error> {
    let media_type: String = row.try_get("media_type")?;
    let media_type: MediaType = media_type.parse().map_err(|e: SharedError| sqlx::Error::Decode(e.into()))?;

    Ok(PostResponse {
        id: row.try_get("id")?,
        author: summary_from_row(row, "author")?,
        media_type,
        media_url: row.try_get("media_url")?,
        caption: row.try_get("caption")?,
        challenge_id: row.try_get("challenge_id")?,
        like_count: row.try_get("like_count")?,
        comment_count: row.try_get("comment_count")?,
        donation_total_cents: row.try_get("donation_total_cents")?,
        liked_by_me: row.try_get("liked_by_me")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a post and return its ID
pub async fn create_post(
    pool: &SqlitePool,
    author_id: Uuid,
    media_type: MediaType,
    media_url: Option<&str>,
    caption: &str,
    challenge_id: Option<Uuid>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO posts (id, author_id, media_type, media_url, caption, challenge_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(author_id)
    .bind(media_type.as_str())
    .bind(media_url)
    .bind(caption)
    .bind(challenge_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(id)
}

/// A post with aggregates as seen by `viewer_id`
pub async fn get_post(pool: &SqlitePool, post_id: Uuid, viewer_id: Uuid) -> Result<Option<PostResponse>, sqlx::Error> {
    let mut qb = post_select(viewer_id);
    qb.push(" WHERE p.id = ").push_bind(post_id);

    let row = qb.build().fetch_optional(pool).await?;
    row.as_ref().map(post_from_row).transpose()
}

/// A page of posts
pub async fn list_posts(
    pool: &SqlitePool,
    viewer_id: Uuid,
    filter: PostFilter,
    order: PostOrder,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostResponse>, sqlx::Error> {
    let mut qb = post_select(viewer_id);
    qb.push(" WHERE 1 = 1");

    if filter.scope == FeedScope::Following {
        qb.push(" AND (p.author_id = ")
            .push_bind(viewer_id)
            .push(" OR p.author_id IN (SELECT followee_id FROM follows WHERE follower_id = ")
            .push_bind(viewer_id)
            .push("))");
    }
    if let Some(media_type) = filter.media_type {
        qb.push(" AND p.media_type = ").push_bind(media_type.as_str());
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(challenge_id) = filter.challenge_id {
        qb.push(" AND p.challenge_id = ").push_bind(challenge_id);
    }

    match order {
        PostOrder::Newest => qb.push(" ORDER BY p.created_at DESC, p.rowid DESC"),
        PostOrder::MostLiked => qb.push(" ORDER BY like_count DESC, p.created_at ASC, p.rowid ASC"),
    };
    qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(post_from_row).collect()
}

pub async fn post_author(pool: &SqlitePool, post_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT author_id FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Delete a post. Likes and comments cascade; donations keep their creator.
pub async fn delete_post(pool: &SqlitePool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Flip the like of `user_id` on a post; returns `(liked, like_count)`
pub async fn toggle_like(pool: &SqlitePool, post_id: Uuid, user_id: Uuid) -> Result<(bool, i64), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if removed == 0 {
        sqlx::query("INSERT INTO post_likes (post_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        true
    } else {
        false
    };

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((liked, count))
}

fn comment_select() -> String {
    format!(
        "SELECT c.id, c.post_id, c.text, c.created_at, {} \
         FROM comments c JOIN users u ON u.id = c.author_id",
        summary_columns("u", "author")
    )
}

fn comment_from_row(row: &SqliteRow) -> Result<CommentResponse, sqlx::Error> {
    Ok(CommentResponse {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author: summary_from_row(row, "author")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn create_comment(
    pool: &SqlitePool,
    post_id: Uuid,
    author_id: Uuid,
    text: &str,
) -> Result<CommentResponse, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query("INSERT INTO comments (id, post_id, author_id, text, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(id)
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    let row = sqlx::query(&format!("{} WHERE c.id = ?", comment_select()))
        .bind(id)
        .fetch_one(pool)
        .await?;
    comment_from_row(&row)
}

/// Comments of a post, oldest first
pub async fn list_comments(pool: &SqlitePool, post_id: Uuid) -> Result<Vec<CommentResponse>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "{} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.rowid ASC",
        comment_select()
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(comment_from_row).collect()
}

/// `(post_id, author_id)` of a comment
pub async fn comment_owner(pool: &SqlitePool, comment_id: Uuid) -> Result<Option<(Uuid, Uuid)>, sqlx::Error> {
    sqlx::query_as("SELECT post_id, author_id FROM comments WHERE id = ?")
        .bind(comment_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_comment(pool: &SqlitePool, comment_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}
