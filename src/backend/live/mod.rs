//! Live Module
//!
//! Live-stream announcements and the in-memory registry of who is live and
//! who is watching. Audio and video travel peer to peer; the server only
//! relays signaling payloads through the realtime rooms.

pub mod handlers;
pub mod state;

pub use handlers::*;
pub use state::{LiveRegistry, LiveStream};
