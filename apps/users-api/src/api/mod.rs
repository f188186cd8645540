//! API routes module

pub mod ready;

use axum::Router;
use database::sqlite::DatabaseConnection;
use domain_users::{SqliteUserRepository, UserService, handlers};

/// Create all API routes
pub fn routes(db: DatabaseConnection) -> Router {
    let repository = SqliteUserRepository::new(db);
    let service = UserService::new(repository);

    Router::new().nest("/users", handlers::router(service))
}
