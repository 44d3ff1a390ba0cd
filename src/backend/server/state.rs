/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The validated server configuration
 * - The SQLite connection pool
 * - The room registry used for chat, notifications and signaling
 * - The registry of active live streams
 *
 * # Thread Safety
 *
 * All state is designed to be thread-safe and cheap to clone:
 * - `Arc<ServerConfig>` is read-only after startup
 * - `SqlitePool` is internally reference counted
 * - `RoomRegistry` and `LiveRegistry` share their maps through `Arc`
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`.
 *
 * # Example
 *
 * ```rust,no_run
 * use talent_haven::backend::realtime::RoomRegistry;
 * use axum::extract::State;
 *
 * async fn handler(State(rooms): State<RoomRegistry>) {
 *     let rooms_open = rooms.room_count();
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::live::LiveRegistry;
use crate::backend::realtime::RoomRegistry;
use crate::backend::server::config::ServerConfig;

/// Application state shared by all handlers
///
/// # Fields
///
/// * `config` - Validated configuration
/// * `db` - SQLite connection pool
/// * `rooms` - Broadcast rooms for real-time delivery
/// * `live` - Active live streams
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub rooms: RoomRegistry,
    pub live: LiveRegistry,
}

impl AppState {
    pub fn new(config: ServerConfig, db: SqlitePool) -> Self {
        let rooms = RoomRegistry::new(config.broadcast_capacity);
        Self {
            config: Arc::new(config),
            db,
            rooms,
            live: LiveRegistry::new(),
        }
    }
}

/// Implement FromRef for SqlitePool
///
/// This allows Axum handlers to extract the database pool directly
/// using `State(SqlitePool)`.
impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}

/// Implement FromRef for RoomRegistry
impl FromRef<AppState> for RoomRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

/// Implement FromRef for LiveRegistry
impl FromRef<AppState> for LiveRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.live.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
