use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use shmprom_core::error::{Result, ShmPromError};

use crate::server::validate_scrape_path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub persist: PersistSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ShmPromError::UnsupportedVersion);
        }

        self.exporter.validate()?;
        self.persist.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_path")]
    pub path: String,

    /// Optional prefix joined to every gauge name with `_`.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            namespace: None,
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        validate_scrape_path(&self.path).map_err(|e| match e {
            ShmPromError::Config(msg) => ShmPromError::Config(format!("exporter.path: {msg}")),
            other => other,
        })?;
        if let Some(ns) = &self.namespace {
            let valid = !ns.is_empty()
                && !ns.starts_with(|c: char| c.is_ascii_digit())
                && ns.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(ShmPromError::Config(format!(
                    "exporter.namespace is not a valid metric prefix: {ns:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ShmPromError::Config(format!(
                "exporter.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistSection {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// 0 disables the periodic flush loop.
    #[serde(default)]
    pub flush_interval_secs: u64,
}

impl Default for PersistSection {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            flush_interval_secs: 0,
        }
    }
}

impl PersistSection {
    pub fn validate(&self) -> Result<()> {
        if self.flush_interval_secs > 86_400 {
            return Err(ShmPromError::Config(
                "persist.flush_interval_secs must be at most 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Option<Duration> {
        (self.flush_interval_secs > 0).then(|| Duration::from_secs(self.flush_interval_secs))
    }
}

fn default_listen() -> String {
    "0.0.0.0:9090".into()
}
fn default_path() -> String {
    "/metrics".into()
}
fn default_dir() -> PathBuf {
    PathBuf::from(".")
}
