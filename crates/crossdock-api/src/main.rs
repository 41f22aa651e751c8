//! # crossdock-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the Crossdock billing API.
//! Binds to a configurable address (default 0.0.0.0:8080).

use crossdock_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = crossdock_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::new(config.clone()).with_pool(db_pool);

    // Hydrate the charge ledger from the database (if connected).
    if let Some(pool) = state.db_pool.clone() {
        crossdock_api::db::hydrate(&state, &pool).await.map_err(|e| {
            tracing::error!("Database hydration failed: {e}");
            e
        })?;
    }

    // Install the Prometheus recorder unless metrics are disabled.
    let prometheus = if config.metrics_enabled {
        Some(crossdock_api::metrics::install_recorder().map_err(|e| {
            tracing::error!("Prometheus recorder installation failed: {e}");
            e
        })?)
    } else {
        tracing::info!("Metrics disabled — /metrics will not be served");
        None
    };

    let app = crossdock_api::app(state, prometheus);

    tracing::info!("Crossdock API listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
