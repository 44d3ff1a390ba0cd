/**
 * Real-time Event System
 *
 * This module defines event types for the real-time layer. Events are
 * published into rooms and delivered to every WebSocket connection or
 * notification stream currently joined to that room.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of real-time event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Chat message event
    Message,
    /// User notification event
    Notification,
    /// Status update event (stream started/ended, ...)
    Status,
    /// Typing indicator event
    Typing,
    /// Live-stream signaling payload relayed between peers
    Signal,
    /// Live-stream viewer count update
    ViewerCount,
}

impl EventType {
    /// Name used for the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            EventType::Message => "message",
            EventType::Notification => "notification",
            EventType::Status => "status",
            EventType::Typing => "typing",
            EventType::Signal => "signal",
            EventType::ViewerCount => "viewer_count",
        }
    }
}

/// Real-time event that can be published to a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event_type: EventType,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred (RFC 3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a chat message event
    pub fn message(sender_id: Uuid, sender: &str, text: &str) -> Self {
        Self::new(
            EventType::Message,
            serde_json::json!({
                "sender_id": sender_id,
                "sender": sender,
                "text": text,
            }),
        )
    }

    /// Create a notification event from any serializable notification body
    pub fn notification(payload: serde_json::Value) -> Self {
        Self::new(EventType::Notification, payload)
    }

    /// Create a status event
    pub fn status(status: &str, details: Option<serde_json::Value>) -> Self {
        Self::new(
            EventType::Status,
            serde_json::json!({
                "status": status,
                "details": details,
            }),
        )
    }

    /// Create a typing event
    pub fn typing(user_id: Uuid, user: &str, is_typing: bool) -> Self {
        Self::new(
            EventType::Typing,
            serde_json::json!({
                "user_id": user_id,
                "user": user,
                "is_typing": is_typing,
            }),
        )
    }

    /// Create a signaling event addressed to a single peer
    pub fn signal(stream_id: Uuid, from: Uuid, payload: serde_json::Value) -> Self {
        Self::new(
            EventType::Signal,
            serde_json::json!({
                "stream_id": stream_id,
                "from": from,
                "payload": payload,
            }),
        )
    }

    /// Create a viewer count event
    pub fn viewer_count(stream_id: Uuid, viewers: usize) -> Self {
        Self::new(
            EventType::ViewerCount,
            serde_json::json!({
                "stream_id": stream_id,
                "viewers": viewers,
            }),
        )
    }
}
