//! WebSocket Frames
//!
//! Every frame is a JSON object tagged by `type`:
//!
//! ```json
//! {"type":"join","room":"stream:6f1c..."}
//! {"type":"chat","room":"chat:1a2b...:9f8e...","text":"hi"}
//! {"type":"event","room":"user:1a2b...","event":{"event_type":"notification",...}}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::{RealtimeEvent, SharedError};

/// Frame sent by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Join { room: String },
    Leave { room: String },
    Chat { room: String, text: String },
    Typing { room: String, is_typing: bool },
    /// Live-stream signaling payload (offer, answer, ICE candidate) for one peer
    Signal {
        stream_id: Uuid,
        to: Uuid,
        payload: serde_json::Value,
    },
}

/// Frame sent by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Joined { room: String },
    Left { room: String },
    Event { room: String, event: RealtimeEvent },
    Error { message: String },
}

impl ServerFrame {
    pub fn error(message: impl Into<String>) -> Self {
        ServerFrame::Error {
            message: message.into(),
        }
    }
}

impl From<SharedError> for ServerFrame {
    fn from(err: SharedError) -> Self {
        ServerFrame::error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_frame_parsing() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"join","room":"stream:abc"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Join {
                room: "stream:abc".to_string()
            }
        );

        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"typing","room":"chat:a:b","is_typing":true}"#).unwrap();
        assert!(matches!(frame, ClientFrame::Typing { is_typing: true, .. }));

        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"shout","room":"x"}"#).is_err());
    }

    #[test]
    fn test_rejected_input_becomes_error_frame() {
        let frame: ServerFrame = SharedError::room_denied("user:1", "cannot join another user's room").into();
        assert_eq!(
            frame,
            ServerFrame::Error {
                message: "user:1: cannot join another user's room".to_string()
            }
        );

        let err = serde_json::from_str::<ClientFrame>("not json").unwrap_err();
        let frame: ServerFrame = SharedError::from(err).into();
        assert!(matches!(frame, ServerFrame::Error { ref message } if message.starts_with("invalid frame")));
    }

    #[test]
    fn test_server_frame_tagging() {
        let json = serde_json::to_value(ServerFrame::error("nope")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "nope");

        let json = serde_json::to_value(ServerFrame::Joined {
            room: "user:1".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "joined");
    }
}
