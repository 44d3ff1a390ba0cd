/**
 * Notification Stream
 *
 * Server-Sent Events view of a user's personal room for clients that do
 * not hold a WebSocket open (`GET /api/notifications/stream`).
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - Lagged receivers skip ahead instead of dropping the connection
 * - The stream ends when the room's channel is closed
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: notification
 * data: {"event_type":"notification","payload":{...},"timestamp":"..."}
 * ```
 */

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::Stream;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;

use super::rooms::{Room, RoomRegistry};
use crate::backend::middleware::AuthUser;
use crate::shared::RealtimeEvent;

/// Handle notification subscription (GET /api/notifications/stream)
pub async fn notifications_stream(
    State(rooms): State<RoomRegistry>,
    AuthUser(auth): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let room = Room::User(auth.user_id);
    let receiver = rooms.subscribe(room);
    tracing::info!("[SSE] {} subscribed to {}", auth.username, room);

    // Only real events are yielded; keep-alive comments are injected by axum.
    let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => to_sse_event(&event).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("[SSE] Receiver lagged, skipped {} events", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &RealtimeEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.event_type.name()).data(data)),
        Err(e) => {
            tracing::error!("[SSE] Failed to serialize event: {:?}", e);
            None
        }
    }
}
