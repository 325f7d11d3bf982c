//! Startup helpers for the therapy relay server.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::config::RelayConfig;
use crate::server::{self, AppState};
use crate::session::{SessionSweeper, SweeperConfig};

/// Run the server until Ctrl+C (used by the `therapy-relay` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    // A missing .env file is fine: the process environment is used as-is.
    dotenv::dotenv().ok();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .init();

    tracing::info!("Starting therapy relay v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(serve()) {
        tracing::error!("Server error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Build the log filter from `RUST_LOG`-style directives, `info` when empty.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Load configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if the environment is invalid or state creation fails.
pub fn initialize() -> anyhow::Result<(RelayConfig, Arc<AppState>)> {
    let config = RelayConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let state = AppState::new(&config).context("Failed to create state")?;
    Ok((config, state))
}

async fn serve() -> anyhow::Result<()> {
    let (config, state) = initialize()?;

    let sweeper = config.session_idle_ttl.map(|ttl| {
        let sweeper = SessionSweeper::new(Arc::clone(&state.sessions), SweeperConfig::for_ttl(ttl));
        let shutdown = sweeper.shutdown_notifier();
        (sweeper.spawn(), shutdown)
    });
    if sweeper.is_none() {
        tracing::info!("Idle session eviction disabled; sessions live until shutdown");
    }

    let result = server::run_server_with_shutdown(Arc::clone(&state), config.port, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("HTTP server failed");

    if let Some((handle, shutdown)) = sweeper {
        shutdown.notify_one();
        if let Err(e) = handle.await {
            tracing::warn!("Sweeper task ended abnormally: {e}");
        }
    }

    let dropped = state.sessions.len();
    state.sessions.clear();
    tracing::info!(sessions = dropped, "Session store cleared; relay stopped");

    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
