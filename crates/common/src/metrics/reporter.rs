//! Hooks notified when metrics enter or leave the store.

use std::fmt::Debug;

use super::error::MetricsResult;
use super::name::MetricName;

/// Listener for metric registration changes
///
/// Reporters see names only; values are read from the store when needed.
/// `metric_change` failures abort the registration that triggered them;
/// `metric_removal` failures are collected after the removal has happened.
pub trait MetricsReporter: Send + Sync + Debug {
    /// Reporter name used in error messages
    fn name(&self) -> &str;

    /// Called once with the metrics already present when the reporter is added
    fn init(&self, _existing: &[MetricName]) -> MetricsResult<()> {
        Ok(())
    }

    /// A metric was registered
    fn metric_change(&self, metric: &MetricName) -> MetricsResult<()>;

    /// A metric was removed
    fn metric_removal(&self, metric: &MetricName) -> MetricsResult<()>;

    /// The store is shutting down
    fn close(&self) {}
}
