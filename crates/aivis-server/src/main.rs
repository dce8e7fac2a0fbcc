use anyhow::Context;
use tracing::info;

use aivis_server::config::ServerConfig;
use aivis_server::{AppState, app, log_filter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref(), "info"))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config)?;
    info!(
        bind = %config.bind,
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        checkout = state.checkout.name(),
        "starting aivis server"
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("aivis server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
