#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use coachnotes::api::{build_router, AppState};
use coachnotes::config::{ConfigurationLoader, EnvironmentLoader};
use coachnotes::observability::init_logging;
use coachnotes::store::Database;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Sports coaching notes API server
#[derive(Debug, Parser)]
#[command(name = "coachnotes", version, about)]
struct Args {
    /// Path to TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Path to a .env file to load before reading the environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Listen port (overrides config and PORT)
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvironmentLoader::new(args.env_file.as_deref());
    let mut loader = ConfigurationLoader::new(args.config.as_deref())?;
    let rejected = loader.apply_environment(&env);
    if let Some(port) = args.port {
        loader.config.server.port = port;
    }
    let config = loader.config;

    init_logging(&config.logging)?;
    for setting in &rejected {
        warn!(variable = setting.name, value = %setting.value, "{setting}");
    }

    let db = Database::open(config.database.url.as_deref(), &config.database.name).await;
    let app = build_router(AppState::new(db));

    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("coachnotes listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
