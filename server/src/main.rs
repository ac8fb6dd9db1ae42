//! Roost Server - Main Entry Point
//!
//! Maintenance-mode backend for the Roost forum platform.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use roost_server::{api, config, db, maintenance};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Roost Server");

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // Sitewide configuration store
    let store: Arc<dyn maintenance::ConfigStore> =
        Arc::new(maintenance::PgConfigStore::new(db_pool.clone()));

    // Seed the default banner text if the module has never been enabled
    maintenance::lifecycle::enable(&*store).await?;
    info!("Maintenance module ready");

    // Build application state
    let state = api::AppState::new(db_pool, config.clone(), store);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
