//! Profiles Module
//!
//! Public profiles with follower, following and post counts, profile
//! editing, and user search.

pub mod db;
pub mod handlers;

pub use handlers::*;
