//! Users API - REST server

use axum_helpers::server::{close_database, create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::sqlite::run_migrations;
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to SQLite at {}", config.sqlite.url());

    let db = database::sqlite::connect_from_config_with_retry(config.sqlite.clone(), None).await?;

    run_migrations::<Migrator>(&db, "users_api").await?;

    // Build REST router
    let api_routes = api::routes(db.clone());
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router
        .merge(health_router(config.app.clone()))
        .merge(api::ready::router(db.clone()));

    info!("Starting Users API on port {}", config.server.port);

    // Run server with graceful shutdown
    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        close_database(db, "users").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
