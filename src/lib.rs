// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! Talent Haven - Main Library
//!
//! Talent Haven is the backend of a social platform for creators to show
//! their talent: video, audio, image and text posts, follows, likes and
//! comments, live streams, talent challenges, and a donation ledger that
//! lets fans support creators directly.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between the server and its clients
//!   - Request and response bodies of the JSON API
//!   - Real-time event types
//!   - Validation helpers and error types
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, WebSocket rooms, SSE notification stream
//!   - Authentication with bcrypt and JWT
//!   - SQLite persistence through sqlx
//!
//! # Usage
//!
//! ```rust,no_run
//! use talent_haven::backend::server::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app().await?;
//! // Serve with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! All server state is shared through `Arc`: the SQLite pool, the
//! broadcast room registry (`Mutex`) and the live-stream registry
//! (`RwLock`).
//!
//! # Error Handling
//!
//! - `shared::SharedError` for bad client input (request bodies and WebSocket frames)
//! - `backend::BackendError` for everything a handler can return

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
