//! yield-service - Yield prediction gateway entry point
//!
//! Resolves configuration, opens the prediction database, wires the predictor
//! client and orchestrator, and serves the HTTP API until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yield_common::config::{ConfigOverrides, ServiceConfig};
use yield_common::db::init_database;
use yield_service::db::SqlitePredictionStore;
use yield_service::services::{HttpPredictorClient, PredictionOrchestrator};
use yield_service::{build_router, AppState};

/// Command-line arguments for yield-service
///
/// Anything not given here falls back to `YIELD_*` environment variables,
/// then the config file, then compiled defaults.
#[derive(Parser, Debug)]
#[command(name = "yield-service")]
#[command(about = "Yield prediction gateway")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the external yield predictor
    #[arg(long)]
    predictor_url: Option<String>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Shared secret expected in the X-API-KEY header
    #[arg(long)]
    api_key: Option<String>,

    /// Predictor call timeout in milliseconds
    #[arg(long)]
    predictor_timeout_ms: Option<u64>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_file: args.config,
            predictor_url: args.predictor_url,
            api_key: args.api_key,
            database_path: args.database,
            port: args.port,
            predictor_timeout_ms: args.predictor_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Resolved before tracing init: the log level comes from config
    let config = ServiceConfig::resolve(&ConfigOverrides::from(args))
        .context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("yield_service={0},yield_common={0},tower_http=info", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting yield prediction gateway (yield-service) v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Predictor: {}", config.predictor_url);
    info!("Predictor timeout: {:?}", config.predictor_timeout);
    info!("Persistence policy: {:?}", config.persistence_policy);
    info!("Database path: {}", config.database_path.display());

    if config.api_key.is_some() {
        info!("API key authentication enabled");
    } else {
        warn!("API key authentication disabled (no api_key configured)");
    }

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let predictor = HttpPredictorClient::from_config(&config)
        .context("Failed to build predictor client")?;
    let store = SqlitePredictionStore::new(pool);

    let orchestrator = Arc::new(PredictionOrchestrator::new(
        Arc::new(predictor),
        Arc::new(store),
        config.persistence_policy,
    ));

    let state = AppState::new(orchestrator, config.api_key.clone());
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("yield-service listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
