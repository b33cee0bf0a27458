//! shmprom core: the session metric model and the shared error type.
//!
//! This crate defines the three metric groups an IPC session reports, the
//! fixed set of sixteen metric fields derived from them, and the error surface
//! shared by the exporter. It carries no transport or runtime dependencies so
//! producers can depend on it without pulling in the HTTP stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

pub use error::{ErrorClass, Result, ShmPromError};
pub use metrics::{
    MetricField, MetricGroup, MetricsSnapshot, PerformanceMetrics, SessionHandle,
    ShareMemoryMetrics, StabilityMetrics,
};
