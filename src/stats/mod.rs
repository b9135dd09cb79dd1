//! Statistics

pub mod metrics;

pub use metrics::BridgeStats;
