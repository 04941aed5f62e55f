//! # Faultline Core
//!
//! Per-task error-handling metrics for record-processing pipelines.
//!
//! This crate contains:
//! - The task identity that scopes every metric group
//! - [`ErrorMetricsRegistry`]: seven counters and one gauge describing how a
//!   task copes with failing records
//! - Configuration of the group name and tag keys
//!
//! ## Architecture Principles
//! - Only depends on `faultline-common`
//! - No I/O on the recording path
//! - Metrics live in a caller-owned `MetricsRegistry`

pub mod config;
pub mod errors;
pub mod task;

pub use config::ErrorMetricsConfig;
pub use errors::{ErrorMetricNames, ErrorMetricsRegistry};
pub use task::ConnectorTaskId;
