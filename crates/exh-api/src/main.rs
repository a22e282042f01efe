//! # exh-api: Binary Entry Point
//!
//! Reads configuration from the environment, builds the exchange service,
//! optionally connects to Postgres and hydrates the repository, then serves
//! the router.

use exh_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;

    let metrics = exh_api::middleware::metrics::install_recorder().map_err(|e| {
        tracing::error!("Metrics recorder installation failed: {e}");
        e
    })?;

    let db_pool = exh_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::from_config(&config)
        .await
        .map_err(|e| {
            tracing::error!("Startup failed: {e}");
            e
        })?
        .with_db_pool(db_pool)
        .with_metrics(metrics);

    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = exh_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Exhortos API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
