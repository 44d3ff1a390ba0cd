//! Challenges Module
//!
//! Time-boxed talent challenges. Posts created with a `challenge_id` while
//! the challenge is running become its entries.

pub mod db;
pub mod handlers;

pub use handlers::*;
