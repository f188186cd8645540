use sea_orm::ConnectOptions;
use std::time::Duration;
use tracing::log::LevelFilter;

#[cfg(feature = "config")]
use core_config::{env_or_default, ConfigError, FromEnv};

/// SQLite database configuration
///
/// The embedded store lives in a single local file; there is no network
/// address to configure. `path` may also be the special value `:memory:`
/// for an in-memory database.
///
/// # Example
///
/// ```ignore
/// use database::sqlite::SqliteConfig;
///
/// // Manual construction
/// let config = SqliteConfig::new("data/users.db");
///
/// // From environment variables (requires `config` feature)
/// let config = SqliteConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteConfig {
    /// Path to the database file (or `:memory:`)
    pub path: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,

    /// Enable SQL query logging
    pub sqlx_logging: bool,

    /// SQL logging level
    pub sqlx_logging_level: LevelFilter,
}

impl SqliteConfig {
    /// Create a new SqliteConfig with default pool settings
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            // SQLite serializes writes internally; a small pool is enough
            max_connections: 5,
            acquire_timeout_secs: 8,
            sqlx_logging: true,
            sqlx_logging_level: LevelFilter::Debug,
        }
    }

    /// Create an in-memory configuration (used by tests)
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// The SeaORM connection URL for this configuration
    ///
    /// `mode=rwc` creates the database file on first access if absent.
    pub fn url(&self) -> String {
        if self.path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", self.path)
        }
    }

    /// Convert this config into SeaORM ConnectOptions
    pub fn into_connect_options(self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url());
        opt.max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(self.sqlx_logging_level);
        opt
    }
}

#[cfg(feature = "config")]
impl FromEnv for SqliteConfig {
    /// Reads from environment variables with sensible defaults:
    /// - SQLITE_PATH: defaults to "data/users.db"
    fn from_env() -> Result<Self, ConfigError> {
        let path = env_or_default("SQLITE_PATH", "data/users.db");
        Ok(Self::new(path))
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new("data/users.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_file_backed() {
        let config = SqliteConfig::new("data/users.db");
        assert_eq!(config.url(), "sqlite://data/users.db?mode=rwc");
    }

    #[test]
    fn test_url_in_memory() {
        let config = SqliteConfig::in_memory();
        assert_eq!(config.url(), "sqlite::memory:");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_env_default_path() {
        temp_env::with_var_unset("SQLITE_PATH", || {
            let config = SqliteConfig::from_env().unwrap();
            assert_eq!(config.path, "data/users.db");
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_env_custom_path() {
        temp_env::with_var("SQLITE_PATH", Some("/tmp/test.db"), || {
            let config = SqliteConfig::from_env().unwrap();
            assert_eq!(config.url(), "sqlite:///tmp/test.db?mode=rwc");
        });
    }
}
