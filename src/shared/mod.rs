//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the HTTP handlers, the real-time layer and the client. These types are
//! used for serialization over the JSON API, the WebSocket protocol and the
//! Server-Sent Events notification stream.
//!
//! # Overview
//!
//! The shared module provides transport-agnostic types that carry no
//! database or server handles. All types are designed for serialization
//! and transmission over HTTP.

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Input validation helpers
pub mod validation;

/// Social domain types (users, posts, ledger, notifications, live streams)
pub mod social;

/// Re-export commonly used types for convenience
pub use event::{RealtimeEvent, EventType};
pub use error::SharedError;
pub use social::{MediaType, NotificationKind, WithdrawalStatus};
