//! Scrape server lifecycle.
//!
//! Each `MetricsServer` owns its listener, router and background task. A bind
//! failure is returned to the caller; stopping is explicit via `shutdown`.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use shmprom_core::error::{Result, ShmPromError};

use crate::registry::MetricsRegistry;
use crate::router;

pub const HEALTH_PATH: &str = "/healthz";

/// Check that `path` can be routed as a literal scrape path.
///
/// The router treats `:` and `*` segments (and `{}` captures) as parameters
/// and refuses duplicate routes, so those are rejected here instead.
pub fn validate_scrape_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ShmPromError::Config("scrape path must not be empty".into()));
    }
    if !path.starts_with('/') {
        return Err(ShmPromError::Config(format!(
            "scrape path must start with '/': {path:?}"
        )));
    }
    if path == HEALTH_PATH {
        return Err(ShmPromError::Config(format!(
            "scrape path must not shadow {HEALTH_PATH}"
        )));
    }
    if path.contains([':', '*', '{', '}']) {
        return Err(ShmPromError::Config(format!(
            "scrape path must be literal (no ':', '*', '{{' or '}}'): {path:?}"
        )));
    }
    Ok(())
}

pub struct MetricsServer {
    local_addr: SocketAddr,
    scrape_path: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl MetricsServer {
    /// Bind `listen` and start serving `registry` at `scrape_path`.
    pub async fn start(
        listen: SocketAddr,
        scrape_path: &str,
        registry: Arc<MetricsRegistry>,
    ) -> Result<Self> {
        validate_scrape_path(scrape_path)?;

        let listener = tokio::net::TcpListener::bind(listen)
            .await
            .map_err(|source| ShmPromError::Bind { addr: listen, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ShmPromError::Bind { addr: listen, source })?;

        let app = router::build_router(registry, scrape_path);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!(%local_addr, path = %scrape_path, "metrics endpoint listening");

        Ok(Self {
            local_addr,
            scrape_path: scrape_path.to_string(),
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    /// Actual bound address (differs from the requested one for port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn scrape_path(&self) -> &str {
        &self.scrape_path
    }

    /// Stop accepting scrapes and wait for in-flight ones to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(Ok(())) => {
                tracing::info!(local_addr = %self.local_addr, "metrics endpoint stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(ShmPromError::Internal(format!("metrics server failed: {e}"))),
            Err(e) => Err(ShmPromError::Internal(format!("metrics server task failed: {e}"))),
        }
    }
}

impl Drop for MetricsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
