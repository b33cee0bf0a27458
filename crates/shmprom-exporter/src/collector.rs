//! Snapshot collector: session callback -> gauges + latest-state map.
//!
//! Each ingestion runs two independent steps over the same snapshot:
//! - `publish_gauges` writes every field into the scrape registry
//! - `record_latest` writes every field into the latest-state map
//!
//! The map is guarded by an `RwLock` so `flush` may run on another task while
//! the session keeps reporting. Flush copies the entries out before touching
//! the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::watch;

use shmprom_core::error::Result;
use shmprom_core::metrics::{
    MetricsSnapshot, PerformanceMetrics, SessionHandle, ShareMemoryMetrics, StabilityMetrics,
};

use crate::persist;
use crate::registry::MetricsRegistry;

/// Callback contract an IPC session reports through.
///
/// Called on the session's own reporting schedule, possibly from a timer
/// thread. Implementations must not block.
pub trait SessionMonitor: Send + Sync {
    fn on_emit_session_metrics(
        &self,
        performance: &PerformanceMetrics,
        stability: &StabilityMetrics,
        share_memory: &ShareMemoryMetrics,
        session: &SessionHandle,
    );
}

#[derive(Default)]
struct LatestState {
    values: HashMap<String, f64>,
    session: Option<SessionHandle>,
}

pub struct SnapshotCollector {
    registry: Arc<MetricsRegistry>,
    latest: RwLock<LatestState>,
    persist_dir: PathBuf,
    ingested: AtomicU64,
}

impl SnapshotCollector {
    pub fn new(registry: Arc<MetricsRegistry>, persist_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            latest: RwLock::new(LatestState::default()),
            persist_dir: persist_dir.into(),
            ingested: AtomicU64::new(0),
        }
    }

    /// Ingest one reporting tick.
    pub fn on_snapshot(
        &self,
        performance: &PerformanceMetrics,
        stability: &StabilityMetrics,
        share_memory: &ShareMemoryMetrics,
        session: &SessionHandle,
    ) {
        let snapshot = MetricsSnapshot::new(performance, stability, share_memory);
        self.publish_gauges(&snapshot);
        self.record_latest(&snapshot, *session);

        let n = self.ingested.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(%session, ingested = n, "session metrics ingested");
    }

    pub fn publish_gauges(&self, snapshot: &MetricsSnapshot<'_>) {
        for (field, value) in snapshot.iter() {
            self.registry.set_gauge(field, value);
        }
    }

    pub fn record_latest(&self, snapshot: &MetricsSnapshot<'_>, session: SessionHandle) {
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = latest.session {
            if prev != session {
                tracing::debug!(
                    %prev,
                    %session,
                    "metrics now attributed to a different session"
                );
            }
        }
        for (field, value) in snapshot.iter() {
            // Keys are a fixed set, so only the first ingestion allocates.
            match latest.values.get_mut(field.key()) {
                Some(slot) => *slot = value,
                None => {
                    latest.values.insert(field.key().to_string(), value);
                }
            }
        }
        latest.session = Some(session);
    }

    /// Copy of the latest-state map.
    pub fn latest(&self) -> HashMap<String, f64> {
        self.read_latest().values.clone()
    }

    pub fn latest_value(&self, key: &str) -> Option<f64> {
        self.read_latest().values.get(key).copied()
    }

    /// Session that produced the most recent snapshot.
    pub fn last_session(&self) -> Option<SessionHandle> {
        self.read_latest().session
    }

    /// Number of snapshots ingested since construction.
    pub fn ingested(&self) -> u64 {
        self.ingested.load(Ordering::Relaxed)
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    /// Persist the latest-state map to `MonitorInfo_<local timestamp>.log`.
    pub fn flush(&self) -> Result<PathBuf> {
        self.flush_at(&Local::now())
    }

    /// Same as [`flush`](Self::flush) with an explicit timestamp.
    pub fn flush_at<Tz>(&self, ts: &DateTime<Tz>) -> Result<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut entries: Vec<(String, f64)> = self.latest().into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let path = persist::write_snapshot(
            &self.persist_dir,
            entries.iter().map(|(k, v)| (k.as_str(), *v)),
            ts,
        )?;
        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            "metrics snapshot flushed"
        );
        Ok(path)
    }

    fn read_latest(&self) -> std::sync::RwLockReadGuard<'_, LatestState> {
        self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionMonitor for SnapshotCollector {
    fn on_emit_session_metrics(
        &self,
        performance: &PerformanceMetrics,
        stability: &StabilityMetrics,
        share_memory: &ShareMemoryMetrics,
        session: &SessionHandle,
    ) {
        self.on_snapshot(performance, stability, share_memory, session);
    }
}

/// Flush every `interval` until `shutdown` flips, then flush once more.
///
/// Ticks before the first ingestion are skipped. Failures are logged and the
/// loop keeps going.
pub async fn run_flush_loop(
    collector: Arc<SnapshotCollector>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        dir = %collector.persist_dir().display(),
        "snapshot flush loop started"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                flush_if_ingested(&collector);
            }
            _ = shutdown.changed() => {
                tracing::info!("snapshot flush loop shutting down");
                flush_if_ingested(&collector);
                break;
            }
        }
    }
}

fn flush_if_ingested(collector: &SnapshotCollector) {
    if collector.ingested() == 0 {
        tracing::debug!("no snapshot ingested yet, skipping flush");
        return;
    }
    if let Err(e) = collector.flush() {
        tracing::error!(
            error = %e,
            class = e.class().as_str(),
            "metrics snapshot flush failed"
        );
    }
}
