//! Feed Module
//!
//! Posts (video, audio, image, text), likes and comments.
//!
//! Posts reference media by URL; the bytes live in external storage.
//! Deleting a post removes its likes and comments, while donations made to
//! it stay on the creator's ledger.

pub mod db;
pub mod handlers;

pub use handlers::*;
