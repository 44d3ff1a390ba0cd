//! Client Input Errors
//!
//! `SharedError` describes input a client got wrong, whether it arrived as an
//! HTTP body or as a WebSocket frame. Handlers wrap it in `BackendError`
//! (always a 400); the socket turns it into an `error` frame and keeps the
//! connection open.
//!
//! ```rust
//! use talent_haven::shared::error::SharedError;
//!
//! let error = SharedError::validation("caption", "Caption is too long");
//! assert_eq!(error.to_string(), "Validation error in field 'caption': Caption is too long");
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A field failed validation
    #[error("Validation error in field '{field}': {message}")]
    ValidationError { field: String, message: String },

    /// A WebSocket frame that is not JSON or not a known frame type
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A valid room name the connection may not use right now
    #[error("{room}: {reason}")]
    RoomDenied { room: String, reason: &'static str },

    /// Signaling between users who are not both in the stream
    #[error("signal refused: {0}")]
    SignalRefused(&'static str),
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn room_denied(room: impl ToString, reason: &'static str) -> Self {
        Self::RoomDenied {
            room: room.to_string(),
            reason,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFrame(err.to_string())
    }
}
