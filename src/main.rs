//! flight-delay-api server binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use flight_delay_api::config::{Cli, Config};
use flight_delay_api::server::api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    init_tracing(&cli);

    info!("flight-delay-api v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let mut config = Config::load(&cli.config)?;
    config.apply_cli(&cli);
    let config = Arc::new(config);

    info!(
        listen = config.server.listen,
        max_upload_bytes = config.server.max_upload_bytes,
        cors_permissive = config.server.cors_permissive,
        "Configuration loaded"
    );

    // Build application state.
    let state = Arc::new(AppState::new(config.clone())?);

    if let Some(path) = &config.model.preload_path {
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading model artifact {}", path.display()))?;
        let handle = state
            .load_artifact(&raw)
            .await
            .with_context(|| format!("loading model artifact {}", path.display()))?;
        info!(
            path = %path.display(),
            model_id = %handle.id(),
            kind = %handle.kind(),
            "Preloaded model"
        );
    } else {
        info!("No model preloaded; waiting for POST /model/load/");
    }

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = config.server.listen.clone();
    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        "flight_delay_api=debug,tower_http=debug"
    } else {
        "flight_delay_api=info,tower_http=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
