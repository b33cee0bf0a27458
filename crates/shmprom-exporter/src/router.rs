//! Axum router wiring for the scrape endpoint.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{ops, registry::MetricsRegistry, server::HEALTH_PATH};

pub fn build_router(registry: Arc<MetricsRegistry>, scrape_path: &str) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(ops::healthz))
        .route(scrape_path, get(ops::metrics))
        .with_state(registry)
}
