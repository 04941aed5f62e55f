//! Error-handling metrics of a single task
//!
//! - [`names`]: the fixed metric names, descriptions and templates
//! - [`metrics`]: the per-task registry recording into them

pub mod metrics;
pub mod names;

pub use metrics::ErrorMetricsRegistry;
pub use names::ErrorMetricNames;
