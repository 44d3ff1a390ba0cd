//! Notifications Module
//!
//! Persistent per-user notifications plus their real-time delivery.
//!
//! - **`db`** - Storage and queries
//! - **`dispatch`** - `notify` and `notify_once`, used by the follow, feed, ledger and live modules
//! - **`handlers`** - Listing and read-state endpoints
//!
//! The live stream of a user's notifications is served by
//! `realtime::subscription`.

pub mod db;
pub mod dispatch;
pub mod handlers;

pub use dispatch::{notify, notify_once, NewNotification};
pub use handlers::*;
