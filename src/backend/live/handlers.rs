//! Live Stream HTTP Handlers
//!
//! Streams are announced and ended over HTTP; viewers join the
//! `stream:<id>` room over the WebSocket, where signaling also happens.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::follows::db::follower_ids;
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{notify, NewNotification};
use crate::backend::realtime::Room;
use crate::backend::server::state::AppState;
use crate::shared::social::{LiveStreamResponse, NotificationKind, StartStreamRequest};
use crate::shared::validation::check_text;
use crate::shared::RealtimeEvent;

/// Maximum stream title length
pub const MAX_STREAM_TITLE_LEN: usize = 100;

/// POST /api/live
///
/// Starts a stream and notifies every follower of the host.
///
/// # Errors
///
/// * `400 Bad Request` - Empty or overlong title
/// * `409 Conflict` - The caller is already live
pub async fn start_stream(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<StartStreamRequest>,
) -> Result<(StatusCode, Json<LiveStreamResponse>), BackendError> {
    let title = request.title.trim();
    check_text("title", title, 1, MAX_STREAM_TITLE_LEN)?;

    let host = get_user_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("Not authenticated"))?;

    let stream = state.live.start(host.summary(), title.to_string()).await?;

    let followers = follower_ids(&state.db, auth.user_id).await?;
    let message = format!("{} is live: {}", auth.username, stream.title);
    for follower_id in &followers {
        notify(
            &state.db,
            &state.rooms,
            NewNotification {
                recipient_id: *follower_id,
                actor_id: Some(auth.user_id),
                kind: NotificationKind::LiveStarted,
                post_id: None,
                message: &message,
            },
        )
        .await;
    }
    tracing::info!("[Live] {} notified {} followers", auth.username, followers.len());

    Ok((StatusCode::CREATED, Json(stream.to_response())))
}

/// GET /api/live
pub async fn list_streams(State(state): State<AppState>) -> Json<Vec<LiveStreamResponse>> {
    let streams = state.live.list().await;
    Json(streams.iter().map(|s| s.to_response()).collect())
}

/// GET /api/live/{id}
pub async fn get_stream(
    State(state): State<AppState>,
    Path(stream_id): Path<Uuid>,
) -> Result<Json<LiveStreamResponse>, BackendError> {
    state
        .live
        .get(stream_id)
        .await
        .map(|s| Json(s.to_response()))
        .ok_or_else(|| BackendError::not_found("Live stream not found"))
}

/// POST /api/live/{id}/end
///
/// Host only. Everyone in the stream room receives a `stream_ended` status.
pub async fn end_stream(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(stream_id): Path<Uuid>,
) -> Result<Json<LiveStreamResponse>, BackendError> {
    let stream = state.live.end(stream_id, auth.user_id).await?;

    let details = serde_json::json!({ "stream_id": stream_id });
    state.rooms.publish(
        Room::Stream(stream_id),
        RealtimeEvent::status("stream_ended", Some(details)),
    );

    Ok(Json(stream.to_response()))
}
