//! Gauge registry for the sixteen session metrics.
//!
//! Every exporter owns an isolated `prometheus::Registry`; nothing is
//! registered in the process-wide default registry, so several exporters can
//! coexist in one process (tests do this).

use dashmap::DashMap;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};

use shmprom_core::error::{Result, ShmPromError};
use shmprom_core::metrics::MetricField;

pub struct MetricsRegistry {
    registry: Registry,
    namespace: Option<String>,
    gauges: DashMap<MetricField, Gauge>,
}

impl MetricsRegistry {
    /// Create a fresh registry and declare all sixteen gauges.
    pub fn new(namespace: Option<&str>) -> Result<Self> {
        let this = Self::empty(namespace);
        for field in MetricField::ALL {
            this.declare_gauge(field)?;
        }
        tracing::debug!(gauges = this.gauges.len(), "metrics registry initialized");
        Ok(this)
    }

    /// Registry with no gauges declared yet.
    pub(crate) fn empty(namespace: Option<&str>) -> Self {
        Self {
            registry: Registry::new(),
            namespace: namespace.map(str::to_owned),
            gauges: DashMap::new(),
        }
    }

    /// Create the gauge for `field` and register it.
    ///
    /// Declaring a name twice is a bug in the caller and surfaces as
    /// `ShmPromError::Registration`.
    pub fn declare_gauge(&self, field: MetricField) -> Result<()> {
        let mut opts = Opts::new(field.gauge_name(), field.help());
        if let Some(ns) = &self.namespace {
            opts = opts.namespace(ns.clone());
        }
        let gauge = Gauge::with_opts(opts)
            .map_err(|e| ShmPromError::Registration(format!("{}: {e}", field.gauge_name())))?;
        self.registry
            .register(Box::new(gauge.clone()))
            .map_err(|e| ShmPromError::Registration(format!("{}: {e}", field.gauge_name())))?;
        self.gauges.insert(field, gauge);
        Ok(())
    }

    /// Overwrite the exposed value of `field`.
    pub fn set_gauge(&self, field: MetricField, value: f64) {
        match self.gauges.get(&field) {
            Some(g) => g.set(value),
            None => tracing::warn!(%field, "set on undeclared gauge ignored"),
        }
    }

    pub fn gauge_value(&self, field: MetricField) -> Option<f64> {
        self.gauges.get(&field).map(|g| g.get())
    }

    pub fn declared(&self) -> usize {
        self.gauges.len()
    }

    /// Full exposition name of `field`, namespace included.
    pub fn exposed_name(&self, field: MetricField) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}_{}", field.gauge_name()),
            None => field.gauge_name().to_string(),
        }
    }

    /// Render every gauge in Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| ShmPromError::Encode(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ShmPromError::Encode(e.to_string()))
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}
