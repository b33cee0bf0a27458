//! Shared error type across shmprom crates.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse error classes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The exporter could not come up (bind, config).
    Startup,
    /// Writing a snapshot file failed. Recoverable.
    Persistence,
    /// Invariant violation in the calling code (duplicate gauge).
    Programmer,
    /// Anything else.
    Internal,
}

impl ErrorClass {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Startup => "STARTUP",
            ErrorClass::Persistence => "PERSISTENCE",
            ErrorClass::Programmer => "PROGRAMMER",
            ErrorClass::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ShmPromError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ShmPromError {
    #[error("failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("failed to persist snapshot to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("gauge registration failed: {0}")]
    Registration(String),
    #[error("failed to encode metrics: {0}")]
    Encode(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ShmPromError {
    /// Map the error onto its class.
    pub fn class(&self) -> ErrorClass {
        match self {
            ShmPromError::Bind { .. } => ErrorClass::Startup,
            ShmPromError::Config(_) => ErrorClass::Startup,
            ShmPromError::UnsupportedVersion => ErrorClass::Startup,
            ShmPromError::Persist { .. } => ErrorClass::Persistence,
            ShmPromError::Registration(_) => ErrorClass::Programmer,
            ShmPromError::Encode(_) => ErrorClass::Internal,
            ShmPromError::Internal(_) => ErrorClass::Internal,
        }
    }
}
