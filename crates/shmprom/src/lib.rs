//! Top-level facade crate for shmprom.
//!
//! Re-exports the metric model and the exporter so users can depend on a single crate.

pub mod core {
    pub use shmprom_core::*;
}

pub mod exporter {
    pub use shmprom_exporter::*;
}
