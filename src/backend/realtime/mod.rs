//! Real-time Module
//!
//! Room-based delivery of chat messages, notifications, typing indicators,
//! live-stream viewer counts and signaling payloads.
//!
//! # Architecture
//!
//! - **`rooms`** - `Room` names and the `RoomRegistry` of broadcast channels
//! - **`protocol`** - JSON frames exchanged over the WebSocket
//! - **`socket`** - `GET /ws` connection handler
//! - **`subscription`** - Server-Sent Events stream of a user's own room
//!
//! Everything that produces events (notification dispatch, live streams,
//! WebSocket chat) publishes through the `RoomRegistry` held in `AppState`.
//! Delivery is best effort and not persisted.

pub mod protocol;
pub mod rooms;
pub mod socket;
pub mod subscription;

pub use protocol::{ClientFrame, ServerFrame};
pub use rooms::{Room, RoomRegistry};
pub use socket::ws_handler;
pub use subscription::notifications_stream;
