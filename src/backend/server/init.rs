/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database loading, and route configuration.
 *
 * # Initialization Process
 *
 * The server initialization follows these steps:
 * 1. Load and validate configuration
 * 2. Open the database and run migrations
 * 3. Create the room and live-stream registries
 * 4. Create and configure the router
 * 5. Spawn the periodic room cleanup task
 */

use std::time::Duration;

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// How often rooms without receivers are dropped
pub const ROOM_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Create the application from configuration found in the environment
///
/// # Errors
///
/// Fails when the configuration is invalid or the database cannot be opened.
pub async fn create_app() -> Result<Router<()>, BackendError> {
    let config = ServerConfig::load()
        .map_err(|e| BackendError::handler(axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    create_app_with(config).await
}

/// Create and configure the Axum application from an explicit configuration
///
/// # Initialization Steps
///
/// 1. **Load Database**: Opens the pool and applies migrations
/// 2. **Create State**: Wraps config, pool and registries in `AppState`
/// 3. **Create Router**: Configures all routes and middleware
/// 4. **Start Cleanup**: Periodically drops rooms nobody listens to
pub async fn create_app_with(config: ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("Initializing Talent Haven backend server");

    let db = load_database(&config.database_url).await?;
    let app_state = AppState::new(config, db);

    tracing::info!(
        "Room registry initialized (capacity {} per room)",
        app_state.config.broadcast_capacity
    );

    let app = create_router(app_state.clone());

    let rooms = app_state.rooms.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ROOM_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = rooms.cleanup_inactive();
            tracing::debug!("Cleaned up {} inactive rooms", removed);
        }
    });

    tracing::info!("Router configured with periodic cleanup task");

    Ok(app)
}
