//! Server Module
//!
//! This module contains the server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading, validation and database setup
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - ServerConfig, ConfigError, load_database
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: defaults, TOML file, environment
//! 2. **Database**: SQLite pool plus embedded migrations
//! 3. **State Creation**: room registry and live-stream registry
//! 4. **Router Creation**: routes, auth middleware, tracing
//! 5. **Background Tasks**: periodic cleanup of idle rooms
//!
//! # Example
//!
//! ```rust,no_run
//! use talent_haven::backend::server::{create_app_with, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let app = create_app_with(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{load_database, ConfigError, ServerConfig};
pub use init::{create_app, create_app_with};
pub use state::AppState;
