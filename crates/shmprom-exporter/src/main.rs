//! shmprom exporter
//!
//! - Prometheus scrape endpoint for the sixteen session gauges
//! - Optional periodic flush of the latest snapshot to disk
//! - Final flush on Ctrl-C

use std::process::ExitCode;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use shmprom_exporter::{app_state, config, run_flush_loop};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "shmprom.yaml".to_string());
    match run(&path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, class = e.class().as_str(), "shmprom-exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: &str) -> shmprom_core::Result<()> {
    let cfg = config::load_from_file(config_path)?;
    let state = app_state::AppState::new(cfg)?;

    tracing::info!(listen = %state.cfg().exporter.listen, "shmprom-exporter starting");
    let server = state.start_server().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let flush_task = state.cfg().persist.flush_interval().map(|interval| {
        tokio::spawn(run_flush_loop(state.collector(), interval, shutdown_rx))
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed, shutting down");
    }
    tracing::info!("shutdown requested");

    let _ = shutdown_tx.send(true);
    match flush_task {
        Some(task) => {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "flush loop task failed");
            }
        }
        None if state.collector().ingested() > 0 => {
            state.collector().flush()?;
        }
        None => {}
    }

    server.shutdown().await
}
