//! emo-sandbox - Sandbox scene analysis service
//!
//! Captions uploaded sandbox-play photos and returns a psychological analysis
//! of the scene.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use emo_common::config::{default_config_path, load_toml_config, TomlConfig};
use tokio::signal;
use tracing::{error, info};

use emo_sandbox::analysis::build_analyst;
use emo_sandbox::caption::MockCaptioner;
use emo_sandbox::{build_router, AppState};

const MODULE_NAME: &str = "emo-sandbox";
const DEFAULT_PORT: u16 = 8000;

/// Command-line arguments for emo-sandbox
#[derive(Parser, Debug)]
#[command(name = "emo-sandbox")]
#[command(about = "Sandbox scene captioning and analysis service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "EMO_SANDBOX_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long, env = "EMO_SANDBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Remote analysis endpoint (overrides config file)
    #[arg(long)]
    analysis_endpoint: Option<String>,

    /// API key sent to the remote analysis endpoint
    #[arg(long, env = "EMO_ANALYSIS_API_KEY", hide_env_values = true)]
    analysis_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| default_config_path(MODULE_NAME));
    let mut config = match &config_path {
        Some(path) => load_toml_config(path).context("Failed to load config file")?,
        None => TomlConfig::default(),
    };

    emo_common::logging::init_tracing(&config.logging)?;

    info!(
        "Starting emo-sandbox v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    if args.analysis_endpoint.is_some() {
        config.analysis.endpoint = args.analysis_endpoint.clone();
    }
    if args.analysis_api_key.is_some() {
        config.analysis.api_key = args.analysis_api_key.clone();
    }

    let analyst = build_analyst(&config.analysis).context("Failed to set up analysis")?;
    let state = AppState::new(Arc::new(MockCaptioner), analyst);
    let app = build_router(state);

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("emo-sandbox listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

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
