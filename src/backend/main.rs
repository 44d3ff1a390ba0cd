/**
 * Talent Haven Server Entry Point
 *
 * This is the main entry point for the Talent Haven backend server.
 * It loads configuration, initializes tracing and serves the Axum app.
 */

use talent_haven::backend::server::{create_app_with, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("[STARTUP] Server initialization started");

    let config = ServerConfig::load()?;
    let addr = config.bind_addr();

    let app = create_app_with(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[STARTUP] Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
