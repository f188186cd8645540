//! Database library providing the SQLite connector and shared utilities
//!
//! # Features
//!
//! - `sqlite` (default) - SQLite support with SeaORM
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::sqlite;
//! use migration::Migrator;
//!
//! let db = sqlite::connect("sqlite://data/users.db?mode=rwc").await?;
//! sqlite::run_migrations::<Migrator>(&db, "users_api").await?;
//! ```

// Always available modules
pub mod common;

// Database-specific modules (conditional based on features)
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-exports for convenience
pub use common::{DatabaseError, DatabaseResult};
