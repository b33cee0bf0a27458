//! Shared application state for the exporter.
//!
//! Startup errors are returned (Result instead of panic) so `main` decides how
//! to exit.

use std::sync::Arc;

use shmprom_core::error::Result;

use crate::collector::SnapshotCollector;
use crate::config::ExporterConfig;
use crate::registry::MetricsRegistry;
use crate::server::MetricsServer;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Arc<MetricsRegistry>,
    collector: Arc<SnapshotCollector>,
}

impl AppState {
    /// Declare the gauges and build the collector. Does not touch the network.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let registry = Arc::new(MetricsRegistry::new(cfg.exporter.namespace.as_deref())?);
        let collector = Arc::new(SnapshotCollector::new(
            Arc::clone(&registry),
            cfg.persist.dir.clone(),
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                collector,
            }),
        })
    }

    /// Start the scrape endpoint configured in `exporter`.
    pub async fn start_server(&self) -> Result<MetricsServer> {
        let listen = self.inner.cfg.exporter.listen_addr()?;
        MetricsServer::start(listen, &self.inner.cfg.exporter.path, self.registry()).await
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.inner.registry)
    }

    /// Handle to pass to the IPC session as its metrics monitor.
    pub fn collector(&self) -> Arc<SnapshotCollector> {
        Arc::clone(&self.inner.collector)
    }
}
