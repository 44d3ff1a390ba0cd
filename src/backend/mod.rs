//! Backend Module
//!
//! This module contains all server-side code for Talent Haven: an Axum
//! HTTP and WebSocket server backed by SQLite.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`error`** - Backend-specific error types
//! - **`auth`** - Signup, login, password hashing, session tokens
//! - **`middleware`** - Bearer-token authentication
//! - **`profiles`** - Public profiles, profile editing, user search
//! - **`follows`** - The follow graph
//! - **`feed`** - Posts, likes and comments
//! - **`ledger`** - Donations, balances and withdrawals
//! - **`notifications`** - Stored notifications and their live delivery
//! - **`challenges`** - Talent challenges and leaderboards
//! - **`live`** - Live-stream registry and announcements
//! - **`realtime`** - Rooms, WebSocket protocol, notification stream
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── error/          - Error types
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── profiles/       - Profiles and search
//! ├── follows/        - Follow graph
//! ├── feed/           - Posts, likes, comments
//! ├── ledger/         - Monetization
//! ├── notifications/  - Notifications
//! ├── challenges/     - Challenges
//! ├── live/           - Live streams
//! └── realtime/       - Rooms and WebSocket
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the configuration, the SQLite pool,
//! the `RoomRegistry` and the `LiveRegistry`. Persistent data lives in
//! SQLite; room channels and live streams are in memory only.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`; the error converts into a JSON
//! body `{"error": "..."}` with the matching HTTP status.
//!
//! # Example
//!
//! ```rust,no_run
//! use talent_haven::backend::server::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app().await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Profiles and user search
pub mod profiles;

/// Follow graph
pub mod follows;

/// Posts, likes and comments
pub mod feed;

/// Monetization ledger
pub mod ledger;

/// Notifications
pub mod notifications;

/// Talent challenges
pub mod challenges;

/// Live streams
pub mod live;

/// Real-time rooms, WebSocket and SSE
pub mod realtime;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, AppState};
