//! Per-task registry of error-handling metrics.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use faultline_common::metrics::{
    MetricGroup, MetricNameTemplate, MetricsRegistry, MetricsResult, Sensor, Stat,
};
use faultline_common::time::SharedClock;

use super::names::ErrorMetricNames;
use crate::config::ErrorMetricsConfig;
use crate::task::ConnectorTaskId;

/// Recording handles of the seven counters
#[derive(Debug)]
struct ErrorSensors {
    record_failures: Arc<Sensor>,
    record_errors: Arc<Sensor>,
    records_skipped: Arc<Sensor>,
    retries: Arc<Sensor>,
    errors_logged: Arc<Sensor>,
    dead_letter_queue_produce_requests: Arc<Sensor>,
    dead_letter_queue_produce_failures: Arc<Sensor>,
}

/// Error-handling metrics of one task
///
/// Owns the `task-error-metrics` group tagged with the task's connector name
/// and task index: seven cumulative counters and the `last-error-timestamp`
/// gauge. Construction clears whatever an earlier instance for the same task
/// left behind, so a task restarted without a clean shutdown registers
/// without conflicts.
///
/// Recording takes `&self`, never fails and is safe from many threads. Once
/// [`close`](Self::close) has run, recording calls are ignored.
///
/// # Example
/// ```
/// use faultline_common::metrics::{MetricsConfig, MetricsRegistry};
/// use faultline_core::{ConnectorTaskId, ErrorMetricsRegistry};
///
/// let registry = MetricsRegistry::new(MetricsConfig::default());
/// let metrics = ErrorMetricsRegistry::new(ConnectorTaskId::new("sink-1", 0), &registry)
///     .expect("error metrics");
///
/// metrics.record_failure();
/// metrics.record_retry();
/// metrics.close();
/// assert!(metrics.metric_group().metric_names().is_empty());
/// ```
pub struct ErrorMetricsRegistry {
    task_id: ConnectorTaskId,
    group: Arc<MetricGroup>,
    sensors: ErrorSensors,
    last_error_time: Arc<AtomicU64>,
    clock: SharedClock,
    closed: AtomicBool,
}

impl fmt::Debug for ErrorMetricsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMetricsRegistry")
            .field("task_id", &self.task_id)
            .field("group", &format_args!("{}", self.group.id()))
            .field("last_error_time", &self.last_error_time())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ErrorMetricsRegistry {
    /// Register the error metrics of `task_id` with the default group layout
    pub fn new(task_id: ConnectorTaskId, registry: &MetricsRegistry) -> MetricsResult<Self> {
        Self::with_config(task_id, registry, &ErrorMetricsConfig::default())
    }

    /// Register with a custom group name and tag keys
    ///
    /// Timestamps come from the registry's clock.
    pub fn with_config(
        task_id: ConnectorTaskId,
        registry: &MetricsRegistry,
        config: &ErrorMetricsConfig,
    ) -> MetricsResult<Self> {
        let clock = Arc::clone(registry.store().clock());
        Self::with_clock(task_id, registry, config, clock)
    }

    /// Register with an explicit timestamp source
    ///
    /// # Errors
    ///
    /// Fails when `config` is invalid or a metric cannot be registered, for
    /// example because a reporter rejects it. The group is left empty.
    pub fn with_clock(
        task_id: ConnectorTaskId,
        registry: &MetricsRegistry,
        config: &ErrorMetricsConfig,
        clock: SharedClock,
    ) -> MetricsResult<Self> {
        config.validate()?;

        let task = task_id.task.to_string();
        let group = registry.group(
            &config.group_name,
            &[
                (config.connector_tag.as_str(), task_id.connector.as_str()),
                (config.task_tag.as_str(), task.as_str()),
            ],
        )?;

        // Leftovers of an instance that was never closed.
        if let Err(err) = group.close() {
            tracing::warn!(
                task = %task_id,
                group = %group.id(),
                error = %err,
                "Failed to clear stale error handling metrics"
            );
        }

        let names = ErrorMetricNames::new(config);
        let last_error_time = Arc::new(AtomicU64::new(0));

        let sensors = match Self::register(&group, &names, &last_error_time) {
            Ok(sensors) => sensors,
            Err(err) => {
                if let Err(cleanup) = group.close() {
                    tracing::warn!(
                        task = %task_id,
                        group = %group.id(),
                        error = %cleanup,
                        "Failed to clear partially registered error handling metrics"
                    );
                }
                return Err(err);
            }
        };

        tracing::debug!(task = %task_id, group = %group.id(), "Registered error handling metrics");

        Ok(Self { task_id, group, sensors, last_error_time, clock, closed: AtomicBool::new(false) })
    }

    fn register(
        group: &MetricGroup,
        names: &ErrorMetricNames,
        last_error_time: &Arc<AtomicU64>,
    ) -> MetricsResult<ErrorSensors> {
        let sensors = ErrorSensors {
            record_failures: Self::counter(group, &names.record_failures)?,
            record_errors: Self::counter(group, &names.record_errors)?,
            records_skipped: Self::counter(group, &names.records_skipped)?,
            retries: Self::counter(group, &names.retries)?,
            errors_logged: Self::counter(group, &names.errors_logged)?,
            dead_letter_queue_produce_requests: Self::counter(
                group,
                &names.dead_letter_queue_produce_requests,
            )?,
            dead_letter_queue_produce_failures: Self::counter(
                group,
                &names.dead_letter_queue_produce_failures,
            )?,
        };

        let last = Arc::clone(last_error_time);
        group.add_value_metric(&names.last_error_timestamp, move |_now| {
            last.load(Ordering::Relaxed) as f64
        })?;

        Ok(sensors)
    }

    fn counter(group: &MetricGroup, template: &MetricNameTemplate) -> MetricsResult<Arc<Sensor>> {
        let sensor = group.sensor(template.name());
        sensor.add(group.metric_name(template)?, Stat::CumulativeSum)?;
        Ok(sensor)
    }

    fn record(&self, sensor: &Sensor) {
        if !self.closed.load(Ordering::Acquire) {
            sensor.record();
        }
    }

    /// A record could not be processed
    pub fn record_failure(&self) {
        self.record(&self.sensors.record_failures);
    }

    /// A record processing error was tolerated
    pub fn record_error(&self) {
        self.record(&self.sensors.record_errors);
    }

    pub fn record_skipped(&self) {
        self.record(&self.sensors.records_skipped);
    }

    /// An operation is being retried
    pub fn record_retry(&self) {
        self.record(&self.sensors.retries);
    }

    pub fn record_error_logged(&self) {
        self.record(&self.sensors.errors_logged);
    }

    /// A write to the dead letter queue was attempted
    pub fn record_dead_letter_queue_produce_request(&self) {
        self.record(&self.sensors.dead_letter_queue_produce_requests);
    }

    /// A write to the dead letter queue failed
    pub fn record_dead_letter_queue_produce_failed(&self) {
        self.record(&self.sensors.dead_letter_queue_produce_failures);
    }

    /// Stamp the current time as the task's last error
    ///
    /// Last write wins; the gauge reads the stored value.
    pub fn record_error_timestamp(&self) {
        self.last_error_time.store(self.clock.millis_since_epoch(), Ordering::Relaxed);
    }

    /// Milliseconds since the epoch of the last recorded error, `0` if none
    pub fn last_error_time(&self) -> u64 {
        self.last_error_time.load(Ordering::Relaxed)
    }

    pub fn task_id(&self) -> &ConnectorTaskId {
        &self.task_id
    }

    /// The group holding this task's metrics
    ///
    /// Collaborators may add their own metrics here; [`close`](Self::close)
    /// removes them too.
    pub fn metric_group(&self) -> &Arc<MetricGroup> {
        &self.group
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Remove every metric of the group
    ///
    /// Only the first call removes anything, so closing a stale instance
    /// again cannot wipe the metrics of a newer instance for the same task.
    /// Removal failures are logged.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        tracing::debug!("Removing error handling metrics of group {}", self.group.id());
        if let Err(err) = self.group.close() {
            tracing::warn!(
                task = %self.task_id,
                group = %self.group.id(),
                error = %err,
                "Failed to remove error handling metrics"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use faultline_common::metrics::MetricsConfig;
    use faultline_common::time::MockClock;

    use super::*;
    use crate::errors::names::{LAST_ERROR_TIMESTAMP, TOTAL_RECORD_FAILURES, TOTAL_RETRIES};

    fn value(metrics: &ErrorMetricsRegistry, registry: &MetricsRegistry, name: &str) -> Option<f64> {
        metrics
            .metric_group()
            .metric_names()
            .into_iter()
            .find(|metric| metric.name() == name)
            .and_then(|metric| registry.metric_value(&metric))
    }

    #[test]
    fn test_registers_seven_counters_and_gauge() {
        let registry = MetricsRegistry::new(MetricsConfig::default());
        let metrics =
            ErrorMetricsRegistry::new(ConnectorTaskId::new("c", 0), &registry).expect("metrics");

        let names = metrics.metric_group().metric_names();
        assert_eq!(names.len(), 8);
        for name in &names {
            assert_eq!(name.tag("connector"), Some("c"));
            assert_eq!(name.tag("task"), Some("0"));
        }
        assert_eq!(value(&metrics, &registry, LAST_ERROR_TIMESTAMP), Some(0.0));
    }

    #[test]
    fn test_record_after_close_is_ignored() {
        let registry = MetricsRegistry::new(MetricsConfig::default());
        let metrics =
            ErrorMetricsRegistry::new(ConnectorTaskId::new("c", 0), &registry).expect("metrics");
        let retries = metrics.sensors.retries.clone();

        metrics.record_retry();
        metrics.close();
        metrics.record_retry();

        assert!(metrics.is_closed());
        assert!(value(&metrics, &registry, TOTAL_RETRIES).is_none());
        assert_eq!(retries.metric_names().len(), 1);
    }

    /// Validates the timestamp comes from the injected clock.
    #[test]
    fn test_error_timestamp_uses_clock() {
        let clock = MockClock::at_millis(1_234);
        let registry = MetricsRegistry::new(MetricsConfig::default());
        let metrics = ErrorMetricsRegistry::with_clock(
            ConnectorTaskId::new("c", 1),
            &registry,
            &ErrorMetricsConfig::default(),
            Arc::new(clock.clone()),
        )
        .expect("metrics");

        metrics.record_error_timestamp();
        assert_eq!(metrics.last_error_time(), 1_234);
        assert_eq!(value(&metrics, &registry, LAST_ERROR_TIMESTAMP), Some(1_234.0));
        assert_eq!(value(&metrics, &registry, TOTAL_RECORD_FAILURES), Some(0.0));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let registry = MetricsRegistry::new(MetricsConfig::default());
        let config = ErrorMetricsConfig { task_tag: "connector".to_string(), ..Default::default() };

        let err = ErrorMetricsRegistry::with_config(ConnectorTaskId::new("c", 0), &registry, &config)
            .expect_err("equal tag keys");
        assert!(matches!(err, faultline_common::metrics::MetricsError::Common(_)));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_debug_output() {
        let registry = MetricsRegistry::new(MetricsConfig::default());
        let metrics =
            ErrorMetricsRegistry::new(ConnectorTaskId::new("c", 0), &registry).expect("metrics");
        let rendered = format!("{metrics:?}");
        assert!(rendered.contains("task-error-metrics;connector=c;task=0"));
    }
}
