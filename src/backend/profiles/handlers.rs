//! Profile HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use crate::backend::auth::users::update_profile_fields;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::social::{ProfileResponse, SearchQuery, UpdateProfileRequest, UserSummary};
use crate::shared::validation::check_text;

const MAX_DISPLAY_NAME_LEN: usize = 50;
const MAX_BIO_LEN: usize = 300;

/// GET /api/users/{id}
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, BackendError> {
    let profile = db::get_profile(&pool, user_id, auth.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(profile))
}

/// `None` keeps the field, an empty string clears it
fn normalize(value: &Option<String>) -> Option<Option<&str>> {
    value.as_deref().map(|v| {
        let v = v.trim();
        (!v.is_empty()).then_some(v)
    })
}

/// PATCH /api/users/me
pub async fn update_me(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, BackendError> {
    let display_name = normalize(&request.display_name);
    let bio = normalize(&request.bio);
    let avatar_url = normalize(&request.avatar_url);

    if let Some(Some(name)) = display_name {
        check_text("display_name", name, 1, MAX_DISPLAY_NAME_LEN)?;
    }
    if let Some(Some(bio)) = bio {
        check_text("bio", bio, 0, MAX_BIO_LEN)?;
    }
    if let Some(Some(url)) = avatar_url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(BackendError::validation("avatar_url", "must be an http(s) URL"));
        }
    }

    update_profile_fields(&pool, auth.user_id, display_name, bio, avatar_url).await?;
    tracing::info!("Profile updated for {}", auth.username);

    let profile = db::get_profile(&pool, auth.user_id, auth.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(profile))
}

/// GET /api/users/search?q=
pub async fn search_users(
    State(pool): State<SqlitePool>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>, BackendError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(BackendError::validation("q", "search query cannot be empty"));
    }
    Ok(Json(db::search_users(&pool, q).await?))
}
