use anyhow::Result;
use golden_signals_demo::{create_app, AppConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    info!(
        "Starting golden signals demo v{} with {} metrics",
        env!("CARGO_PKG_VERSION"),
        config.metrics.backend
    );

    let app = create_app(&config).await?;

    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    info!("Listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutdown signal received");
}
