//! Shared building blocks for Faultline crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors, clock abstraction
//! - `observability`: tracing (pulled in by `runtime`)
//! - `runtime`: the metrics substrate (store, sensors, groups, Prometheus
//!   exposition)
//! - `test-utils`: reporter mocks for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod metrics;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "runtime")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use metrics::{
    MetricGroup, MetricGroupId, MetricName, MetricNameTemplate, MetricsConfig, MetricsError,
    MetricsRegistry, MetricsReporter, MetricsResult, PrometheusExporter, Sensor, Stat,
};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SharedClock, SystemClock};
