//! emo-scores - Emotion game score service
//!
//! Stores the results of every completed game round and serves the
//! aggregated emotion recognition summary built from all stored rounds.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use emo_common::config::{
    default_config_path, load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use tokio::signal;
use tracing::{error, info};

use emo_scores::labels::LabelNormalizer;
use emo_scores::stats::StatisticsEngine;
use emo_scores::store::RecordStore;
use emo_scores::summary::SummaryService;
use emo_scores::{build_router, AppState};

const MODULE_NAME: &str = "emo-scores";
const DEFAULT_PORT: u16 = 5000;

/// Command-line arguments for emo-scores
#[derive(Parser, Debug)]
#[command(name = "emo-scores")]
#[command(about = "Score persistence and emotion summary service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "EMO_SCORES_PORT")]
    port: Option<u16>,

    /// Root folder holding the scores directory
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long, env = "EMO_SCORES_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| default_config_path(MODULE_NAME));
    let config = match &config_path {
        Some(path) => load_toml_config(path).context("Failed to load config file")?,
        None => TomlConfig::default(),
    };

    emo_common::logging::init_tracing(&config.logging)?;

    // Build identification first, before any slow startup step
    info!(
        "Starting emo-scores v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_toml_root(config.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let scores_dir = initializer.scores_path();
    info!("Scores directory: {}", scores_dir.display());

    let normalizer = LabelNormalizer::from_config(&config.labels)
        .context("Invalid label configuration")?;
    config
        .summary
        .validate()
        .context("Invalid summary configuration")?;
    info!("Canonical labels: {}", normalizer.names().join(", "));

    let service = SummaryService::new(
        RecordStore::new(scores_dir, &config.store),
        normalizer,
        StatisticsEngine::new(&config.summary),
    );
    let app = build_router(AppState::new(service));

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("emo-scores listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
