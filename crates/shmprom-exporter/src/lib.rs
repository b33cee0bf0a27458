//! shmprom exporter library entry.
//!
//! Turns the periodic metric snapshots of an IPC session into Prometheus
//! gauges, keeps the latest snapshot in memory, and persists it to
//! `MonitorInfo_<timestamp>.log` files. Consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod ops;
pub mod persist;
pub mod registry;
pub mod router;
pub mod server;

pub use collector::{run_flush_loop, SessionMonitor, SnapshotCollector};
pub use registry::MetricsRegistry;
pub use server::MetricsServer;
