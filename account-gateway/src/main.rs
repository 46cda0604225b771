// Account gateway server binary

use account_core::{Config, Metrics, Storage};
use account_gateway::{app, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration, from file when ACCOUNT_CONFIG is set
    let config = match std::env::var("ACCOUNT_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::from_env()?,
    };

    info!(
        "Starting {} {}",
        config.service_name, config.service_version
    );

    let storage = Arc::new(Storage::open(&config)?);
    info!("Event store opened at {}", config.data_dir.display());

    let metrics = Arc::new(Metrics::new()?);
    let state = AppState::new(storage, metrics, &config);

    let listener = tokio::net::TcpListener::bind(&config.http_listen_addr).await?;
    info!("Gateway listening on {}", config.http_listen_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down account gateway");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
