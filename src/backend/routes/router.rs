/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Health check and the WebSocket upgrade (public)
 * 2. Public API routes (signup, login)
 * 3. Protected API routes (everything else under `/api`)
 * 4. Fallback: the built web client when `static_dir` is set, else 404
 */

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::realtime::ws_handler;
use crate::backend::routes::api_routes::{configure_public_routes, protected_routes};
use crate::backend::server::state::AppState;

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> BackendError {
    BackendError::not_found("Route not found")
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state shared by every handler
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler));

    let router = configure_public_routes(router).merge(protected_routes(app_state.clone()));

    let router = match &app_state.config.static_dir {
        Some(dir) => {
            tracing::info!("Serving web client from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        None => router.fallback(not_found),
    };

    router.layer(TraceLayer::new_for_http()).with_state(app_state)
}
