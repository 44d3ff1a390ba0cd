/**
 * WebSocket Connection Handler
 *
 * `GET /ws?token=<jwt>` upgrades to a WebSocket carrying JSON frames
 * (see `protocol`). Browsers cannot set headers on a WebSocket handshake,
 * so the session token travels in the query string.
 *
 * # Connection Layout
 *
 * Each connection runs:
 * - one writer task draining an mpsc queue into the socket
 * - one forwarding task per joined room, copying that room's broadcast
 *   events into the queue
 * - the read loop below, which handles client frames
 *
 * The connection starts joined to its own `user:` room, so notifications
 * and signaling payloads arrive without an explicit join.
 *
 * # Join Rules
 *
 * - `user:<id>` - only your own
 * - `chat:<a>:<b>` - only when you are `a` or `b`
 * - `stream:<id>` - only while the stream is live; joining counts you as a
 *   viewer until you leave or disconnect
 */

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::protocol::{ClientFrame, ServerFrame};
use super::rooms::Room;
use crate::backend::error::BackendError;
use crate::backend::middleware::{authenticate_token, AuthenticatedUser};
use crate::backend::server::state::AppState;
use crate::shared::validation::{check_text, MAX_CHAT_LEN};
use crate::shared::{RealtimeEvent, SharedError};

/// Frames queued for one connection before room forwarders wait
const OUTBOUND_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /ws?token=<jwt>
///
/// # Errors
///
/// * `401 Unauthorized` - Missing, invalid or expired token
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<Response, BackendError> {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BackendError::unauthorized("Missing token"))?;
    let user = authenticate_token(&state, token).await?;

    tracing::info!("[WS] {} connecting", user.username);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

async fn handle_socket(socket: WebSocket, state: AppState, user: AuthenticatedUser) {
    let (mut sink, mut stream) = socket.split();
    let (out, mut queue) = mpsc::channel::<ServerFrame>(OUTBOUND_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(frame) = queue.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[WS] Failed to serialize frame: {:?}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut connection = Connection {
        state,
        user,
        out,
        rooms: HashMap::new(),
    };
    connection.join(Room::User(connection.user.user_id)).await;

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => connection.handle_text(text.as_str()).await,
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum; binary frames carry nothing we understand.
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("[WS] Receive error for {}: {:?}", connection.user.username, e);
                break;
            }
        }
    }

    connection.close().await;
    writer.abort();
}

struct Connection {
    state: AppState,
    user: AuthenticatedUser,
    out: mpsc::Sender<ServerFrame>,
    rooms: HashMap<Room, JoinHandle<()>>,
}

impl Connection {
    async fn send(&self, frame: ServerFrame) {
        // A closed queue means the writer is gone and the read loop is about to end.
        let _ = self.out.send(frame).await;
    }

    async fn reject(&self, err: SharedError) {
        tracing::debug!("[WS] Rejected frame from {}: {}", self.user.username, err);
        self.send(err.into()).await;
    }

    async fn handle_text(&mut self, text: &str) {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                self.reject(e.into()).await;
                return;
            }
        };

        match frame {
            ClientFrame::Join { room } => {
                if let Some(room) = self.parse_room(&room).await {
                    self.join(room).await;
                }
            }
            ClientFrame::Leave { room } => {
                if let Some(room) = self.parse_room(&room).await {
                    self.leave(room).await;
                }
            }
            ClientFrame::Chat { room, text } => {
                if let Some(room) = self.parse_room(&room).await {
                    self.chat(room, &text).await;
                }
            }
            ClientFrame::Typing { room, is_typing } => {
                if let Some(room) = self.parse_room(&room).await {
                    self.typing(room, is_typing).await;
                }
            }
            ClientFrame::Signal {
                stream_id,
                to,
                payload,
            } => self.signal(stream_id, to, payload).await,
        }
    }

    async fn parse_room(&self, name: &str) -> Option<Room> {
        match name.parse::<Room>() {
            Ok(room) => Some(room),
            Err(e) => {
                self.reject(e).await;
                None
            }
        }
    }

    async fn may_join(&self, room: Room) -> Result<(), SharedError> {
        let me = self.user.user_id;
        let denied = |reason| Err(SharedError::room_denied(room, reason));
        match room {
            Room::User(id) if id == me => Ok(()),
            Room::User(_) => denied("cannot join another user's room"),
            Room::Chat(a, b) if a == me || b == me => Ok(()),
            Room::Chat(..) => denied("not a member of this chat"),
            Room::Stream(id) => match self.state.live.get(id).await {
                Some(_) => Ok(()),
                None => denied("stream is not live"),
            },
        }
    }

    async fn join(&mut self, room: Room) {
        if let Err(err) = self.may_join(room).await {
            self.reject(err).await;
            return;
        }

        if !self.rooms.contains_key(&room) {
            let receiver = self.state.rooms.subscribe(room);
            let forwarder = spawn_forwarder(room, receiver, self.out.clone());
            self.rooms.insert(room, forwarder);
            tracing::debug!("[WS] {} joined {}", self.user.username, room);

            if let Room::Stream(stream_id) = room {
                if let Some(viewers) = self.state.live.add_viewer(stream_id, self.user.user_id).await {
                    self.state
                        .rooms
                        .publish(room, RealtimeEvent::viewer_count(stream_id, viewers));
                }
            }
        }

        self.send(ServerFrame::Joined {
            room: room.to_string(),
        })
        .await;
    }

    async fn leave(&mut self, room: Room) {
        let Some(forwarder) = self.rooms.remove(&room) else {
            self.reject(SharedError::room_denied(room, "not joined")).await;
            return;
        };
        forwarder.abort();
        self.left_room(room).await;

        self.send(ServerFrame::Left {
            room: room.to_string(),
        })
        .await;
    }

    /// Bookkeeping after a room's forwarder is gone
    async fn left_room(&self, room: Room) {
        tracing::debug!("[WS] {} left {}", self.user.username, room);
        if let Room::Stream(stream_id) = room {
            if let Some(viewers) = self.state.live.remove_viewer(stream_id, self.user.user_id).await {
                self.state
                    .rooms
                    .publish(room, RealtimeEvent::viewer_count(stream_id, viewers));
            }
        }
    }

    async fn chat(&self, room: Room, text: &str) {
        if !self.rooms.contains_key(&room) {
            self.reject(SharedError::room_denied(room, "join the room before sending to it")).await;
            return;
        }

        let text = text.trim();
        if let Err(e) = check_text("text", text, 1, MAX_CHAT_LEN) {
            self.reject(e).await;
            return;
        }

        self.state
            .rooms
            .publish(room, RealtimeEvent::message(self.user.user_id, &self.user.username, text));
    }

    async fn typing(&self, room: Room, is_typing: bool) {
        if !self.rooms.contains_key(&room) {
            self.reject(SharedError::room_denied(room, "join the room before sending to it")).await;
            return;
        }

        self.state
            .rooms
            .publish(room, RealtimeEvent::typing(self.user.user_id, &self.user.username, is_typing));
    }

    async fn signal(&self, stream_id: Uuid, to: Uuid, payload: serde_json::Value) {
        let live = &self.state.live;
        if !live.is_participant(stream_id, self.user.user_id).await {
            self.reject(SharedError::SignalRefused("you are not in this stream")).await;
            return;
        }
        if !live.is_participant(stream_id, to).await {
            self.reject(SharedError::SignalRefused("target is not in this stream")).await;
            return;
        }

        self.state
            .rooms
            .publish(Room::User(to), RealtimeEvent::signal(stream_id, self.user.user_id, payload));
    }

    async fn close(mut self) {
        let rooms: Vec<(Room, JoinHandle<()>)> = self.rooms.drain().collect();
        for (room, forwarder) in rooms {
            forwarder.abort();
            self.left_room(room).await;
        }
        tracing::info!("[WS] {} disconnected", self.user.username);
    }
}

/// Copy a room's events into the connection queue until the queue closes
fn spawn_forwarder(
    room: Room,
    mut receiver: broadcast::Receiver<RealtimeEvent>,
    out: mpsc::Sender<ServerFrame>,
) -> JoinHandle<()> {
    let name = room.to_string();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let frame = ServerFrame::Event {
                        room: name.clone(),
                        event,
                    };
                    if out.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[WS] Receiver for {} lagged, skipped {} events", name, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
