//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation, health check, WebSocket, fallback
//! - **`api_routes`** - Public and protected `/api` endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use talent_haven::backend::routes::create_router;
//! use talent_haven::backend::server::{load_database, AppState, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let db = load_database(&config.database_url).await?;
//! let router = create_router(AppState::new(config, db));
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// API endpoint wiring
pub mod api_routes;

pub use router::create_router;
