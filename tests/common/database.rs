//! Database test fixtures and test servers
//!
//! Every server gets its own `sqlite::memory:` database (or its own temp
//! file), so tests are isolated without any cleanup.

use axum_test::TestServer;
use sqlx::SqlitePool;
use talent_haven::backend::server::{create_app_with, load_database, ServerConfig};

/// Smallest withdrawal accepted by test servers, in cents
pub const TEST_MIN_WITHDRAWAL_CENTS: i64 = 500;

/// Configuration for tests: in-memory database, fast bcrypt
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        bcrypt_cost: 4,
        min_withdrawal_cents: TEST_MIN_WITHDRAWAL_CENTS,
        feed_page_size: 10,
        ..ServerConfig::default()
    }
}

/// Test configuration over a database file in `dir`
///
/// File databases use a real connection pool, so concurrent requests hit
/// SQLite's locking instead of queueing on a single connection.
pub fn file_config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        database_url: format!("sqlite://{}", dir.path().join("talent-haven.db").display()),
        ..test_config()
    }
}

/// Create a migrated in-memory pool
pub async fn create_test_pool() -> SqlitePool {
    load_database("sqlite::memory:")
        .await
        .expect("Failed to create test database pool")
}

/// Create a test server over a fresh database
pub async fn create_test_server() -> TestServer {
    create_test_server_with(test_config()).await
}

pub async fn create_test_server_with(config: ServerConfig) -> TestServer {
    let app = create_app_with(config).await.expect("Failed to create app");
    TestServer::new(app).expect("Failed to start test server")
}
