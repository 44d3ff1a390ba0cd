//! Follows Module
//!
//! This module handles follow relationships between users.

pub mod db;
pub mod handlers;

pub use handlers::*;
