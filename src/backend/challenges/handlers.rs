//! Challenge HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::db;
use crate::backend::error::BackendError;
use crate::backend::feed::db::{list_posts, PostFilter, PostOrder};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::social::{
    ChallengeDetailResponse, ChallengeResponse, ChallengesQuery, CreateChallengeRequest,
};
use crate::shared::validation::check_text;

/// Maximum challenge title length
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum challenge description length
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Entries shown on a challenge page
pub const LEADERBOARD_SIZE: i64 = 50;

/// POST /api/challenges
///
/// # Errors
///
/// * `400 Bad Request` - Empty title, overlong description, or `ends_at` in the past
pub async fn create_challenge(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<ChallengeResponse>), BackendError> {
    let title = request.title.trim();
    check_text("title", title, 1, MAX_TITLE_LEN)?;

    let description = request.description.as_deref().unwrap_or("").trim();
    check_text("description", description, 0, MAX_DESCRIPTION_LEN)?;

    if request.ends_at <= Utc::now() {
        return Err(BackendError::validation("ends_at", "must be in the future"));
    }

    let id = db::create_challenge(&state.db, auth.user_id, title, description, request.ends_at).await?;
    tracing::info!("Challenge {} '{}' created by {}", id, title, auth.username);

    let challenge = db::get_challenge(&state.db, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Challenge not found"))?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

/// GET /api/challenges?active=true
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ChallengesQuery>,
) -> Result<Json<Vec<ChallengeResponse>>, BackendError> {
    Ok(Json(db::list_challenges(&state.db, query.active).await?))
}

/// GET /api/challenges/{id}
///
/// The challenge with its entries ranked by likes.
pub async fn get_challenge(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(challenge_id): Path<Uuid>,
) -> Result<Json<ChallengeDetailResponse>, BackendError> {
    let challenge = db::get_challenge(&state.db, challenge_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Challenge not found"))?;

    let filter = PostFilter {
        challenge_id: Some(challenge_id),
        ..PostFilter::default()
    };
    let entries = list_posts(&state.db, auth.user_id, filter, PostOrder::MostLiked, LEADERBOARD_SIZE, 0).await?;

    Ok(Json(ChallengeDetailResponse { challenge, entries }))
}
