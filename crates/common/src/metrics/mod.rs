//! Metrics collection substrate
//!
//! Organised the same way as the metrics it serves:
//! - [`name`]: metric names, templates and group ids
//! - [`stat`]: lock-free accumulation cells
//! - [`sensor`]: recording handles that feed stats
//! - [`store`]: the concurrent metric store and value metrics
//! - [`group`]: tagged groups with a shared lifecycle, and the registry that
//!   hands them out
//! - [`reporter`]: hooks notified when metrics come and go
//! - [`exporter`]: Prometheus text exposition
//! - [`config`]: recording level and export namespace

pub mod config;
pub mod error;
pub mod exporter;
pub mod group;
pub mod name;
pub mod reporter;
pub mod sensor;
pub mod stat;
pub mod store;

// Re-export commonly used types
pub use config::{MetricsConfig, RecordingLevel};
pub use error::{MetricsError, MetricsResult};
pub use exporter::PrometheusExporter;
pub use group::{MetricGroup, MetricsRegistry};
pub use name::{MetricGroupId, MetricName, MetricNameTemplate};
pub use reporter::MetricsReporter;
pub use sensor::Sensor;
pub use stat::{Stat, StatCell};
pub use store::{Measurable, MetricSample, MetricStore, RegisteredMetric, ValueFn};
