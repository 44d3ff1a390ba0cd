/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration and
 * opening the SQLite database.
 *
 * # Configuration Sources
 *
 * Configuration is layered, later sources overriding earlier ones:
 * 1. Built-in defaults suitable for local development
 * 2. An optional TOML file (`TALENT_HAVEN_CONFIG`, or `talent-haven.toml`
 *    in the working directory when present)
 * 3. Environment variables (a `.env` file is read by the binary)
 *
 * # Error Handling
 *
 * Unlike optional integrations, the database is required: failing to open
 * it or to run migrations aborts startup.
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::backend::error::BackendError;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "talent-haven.toml";

/// How long a connection waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// sqlx SQLite URL, e.g. `sqlite://talent_haven.db` or `sqlite::memory:`
    pub database_url: String,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime
    pub token_ttl_days: u64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Capacity of each room's broadcast channel
    pub broadcast_capacity: usize,
    /// Smallest withdrawal accepted, in cents
    pub min_withdrawal_cents: i64,
    /// Default feed page size
    pub feed_page_size: u32,
    /// Directory with the built web client, served at `/`
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite://talent_haven.db".to_string(),
            jwt_secret: "change-me-in-production".to_string(),
            token_ttl_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            broadcast_capacity: 1000,
            min_withdrawal_cents: 100,
            feed_page_size: 20,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the optional TOML file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("TALENT_HAVEN_CONFIG").ok().map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; keys missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = parse_value("SERVER_PORT", &port)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("TOKEN_TTL_DAYS") {
            self.token_ttl_days = parse_value("TOKEN_TTL_DAYS", &ttl)?;
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            self.bcrypt_cost = parse_value("BCRYPT_COST", &cost)?;
        }
        if let Some(min) = lookup("MIN_WITHDRAWAL_CENTS") {
            self.min_withdrawal_cents = parse_value("MIN_WITHDRAWAL_CENTS", &min)?;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("database_url"));
        }
        if self.port == 0 {
            return Err(invalid("port", self.port));
        }
        if self.token_ttl_days == 0 {
            return Err(invalid("token_ttl_days", self.token_ttl_days));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(invalid("bcrypt_cost", self.bcrypt_cost));
        }
        if self.broadcast_capacity == 0 {
            return Err(invalid("broadcast_capacity", self.broadcast_capacity));
        }
        if self.min_withdrawal_cents < 0 {
            return Err(invalid("min_withdrawal_cents", self.min_withdrawal_cents));
        }
        if self.feed_page_size == 0 || self.feed_page_size > 100 {
            return Err(invalid("feed_page_size", self.feed_page_size));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

/// Open the SQLite pool and run migrations
///
/// This function:
/// 1. Parses the sqlx SQLite URL, creating the file when missing
/// 2. Enables foreign keys and waits up to `BUSY_TIMEOUT` for write locks
/// 3. Runs the embedded migrations
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, BackendError> {
    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(8)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SERVER_PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("MIN_WITHDRAWAL_CENTS", "500"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.min_withdrawal_cents, 500);
    }

    #[test]
    fn test_env_invalid_number() {
        let mut config = ServerConfig::default();
        let result = config.apply_env(|key| (key == "SERVER_PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: "SERVER_PORT", .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.jwt_secret = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingValue("jwt_secret"))));

        let mut config = ServerConfig::default();
        config.bcrypt_cost = 2;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.feed_page_size = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4000\ndatabase_url = \"sqlite::memory:\"").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.token_ttl_days, 30);
    }

    #[test]
    #[serial]
    fn test_load_reads_file_then_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4100\nfeed_page_size = 15").unwrap();

        std::env::set_var("TALENT_HAVEN_CONFIG", file.path());
        std::env::set_var("SERVER_PORT", "4200");
        let result = ServerConfig::load();
        std::env::remove_var("TALENT_HAVEN_CONFIG");
        std::env::remove_var("SERVER_PORT");

        let config = result.unwrap();
        assert_eq!(config.port, 4200);
        assert_eq!(config.feed_page_size, 15);
    }

    #[tokio::test]
    async fn test_load_in_memory_database() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
