//! The metric store: every registered metric and sensor, plus reporters.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::config::{MetricsConfig, RecordingLevel};
use super::error::{MetricsError, MetricsResult};
use super::name::MetricName;
use super::reporter::MetricsReporter;
use super::sensor::Sensor;
use super::stat::StatCell;
use crate::time::{SharedClock, SystemClock};

/// Evaluation function of a value metric, called with the current time in
/// milliseconds since the UNIX epoch
pub type ValueFn = Arc<dyn Fn(u64) -> f64 + Send + Sync>;

/// How a registered metric produces its value
#[derive(Clone)]
pub enum Measurable {
    /// Accumulated by a sensor
    Stat(Arc<StatCell>),
    /// Computed on every read
    Value(ValueFn),
}

impl Measurable {
    fn measure(&self, now_ms: u64) -> f64 {
        match self {
            Self::Stat(cell) => cell.measure(),
            Self::Value(f) => f(now_ms),
        }
    }
}

impl fmt::Debug for Measurable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stat(cell) => f.debug_tuple("Stat").field(&cell.stat()).finish(),
            Self::Value(_) => f.write_str("Value(<fn>)"),
        }
    }
}

/// A metric as held by the store
#[derive(Debug)]
pub struct RegisteredMetric {
    name: MetricName,
    measurable: Measurable,
}

impl RegisteredMetric {
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    pub fn value(&self, now_ms: u64) -> f64 {
        self.measurable.measure(now_ms)
    }
}

/// Point-in-time reading of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub name: MetricName,
    pub value: f64,
}

/// Concurrent registry of metrics and sensors
///
/// Always handled through an `Arc`: sensors keep a weak handle back to the
/// store so they can register their stats.
pub struct MetricStore {
    config: MetricsConfig,
    clock: SharedClock,
    metrics: DashMap<MetricName, Arc<RegisteredMetric>>,
    sensors: DashMap<String, Arc<Sensor>>,
    reporters: RwLock<Vec<Arc<dyn MetricsReporter>>>,
}

impl fmt::Debug for MetricStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricStore")
            .field("config", &self.config)
            .field("metrics", &self.metrics.len())
            .field("sensors", &self.sensors.len())
            .field("reporters", &self.reporters.read().len())
            .finish_non_exhaustive()
    }
}

impl MetricStore {
    /// Create a store reading time from the system clock
    pub fn new(config: MetricsConfig) -> Arc<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MetricsConfig, clock: SharedClock) -> Arc<Self> {
        Arc::new(Self {
            config,
            clock,
            metrics: DashMap::new(),
            sensors: DashMap::new(),
            reporters: RwLock::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Register a reporter and hand it the metrics that already exist
    pub fn add_reporter(&self, reporter: Arc<dyn MetricsReporter>) -> MetricsResult<()> {
        reporter.init(&self.metric_names())?;
        self.reporters.write().push(reporter);
        Ok(())
    }

    /// Get or create the sensor called `name` at [`RecordingLevel::Info`]
    pub fn sensor(self: &Arc<Self>, name: &str) -> Arc<Sensor> {
        self.sensor_with_level(name, RecordingLevel::Info)
    }

    /// Get or create the sensor called `name`
    ///
    /// An existing sensor is returned as-is, whatever its level.
    pub fn sensor_with_level(self: &Arc<Self>, name: &str, level: RecordingLevel) -> Arc<Sensor> {
        let entry = self.sensors.entry(name.to_string()).or_insert_with(|| {
            let enabled = self.config.recording_level.should_record(level);
            Arc::new(Sensor::new(name, level, enabled, Arc::downgrade(self)))
        });
        Arc::clone(entry.value())
    }

    pub fn get_sensor(&self, name: &str) -> Option<Arc<Sensor>> {
        self.sensors.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a sensor together with every metric it feeds
    ///
    /// Returns whether the sensor existed.
    pub fn remove_sensor(&self, name: &str) -> MetricsResult<bool> {
        let Some((_, sensor)) = self.sensors.remove(name) else {
            return Ok(false);
        };

        let mut first_error = None;
        for metric in sensor.metric_names() {
            if let Err(err) = self.remove_metric(&metric) {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    /// Register a metric
    ///
    /// A reporter rejecting the metric rolls the registration back.
    pub fn add_metric(&self, name: MetricName, measurable: Measurable) -> MetricsResult<()> {
        match self.metrics.entry(name.clone()) {
            Entry::Occupied(_) => {
                return Err(MetricsError::DuplicateMetric { name: name.to_string() });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(RegisteredMetric { name: name.clone(), measurable }));
            }
        }

        if let Err(err) = self.notify_change(&name) {
            self.metrics.remove(&name);
            return Err(err);
        }

        tracing::trace!(metric = %name, "Registered metric");
        Ok(())
    }

    /// Register a metric whose value is computed on every read
    pub fn add_value_metric<F>(&self, name: MetricName, f: F) -> MetricsResult<()>
    where
        F: Fn(u64) -> f64 + Send + Sync + 'static,
    {
        self.add_metric(name, Measurable::Value(Arc::new(f)))
    }

    /// Remove a metric
    ///
    /// The metric is gone even when a reporter fails; the first reporter
    /// error is returned after every reporter has been notified.
    pub fn remove_metric(&self, name: &MetricName) -> MetricsResult<bool> {
        if self.metrics.remove(name).is_none() {
            return Ok(false);
        }
        self.notify_removal(name)?;
        Ok(true)
    }

    pub fn contains(&self, name: &MetricName) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Current value of a metric, evaluated at the clock's current time
    pub fn metric_value(&self, name: &MetricName) -> Option<f64> {
        // Clone out of the shard so value callbacks never run under its lock.
        let metric = self.metrics.get(name).map(|entry| Arc::clone(entry.value()))?;
        Some(metric.value(self.clock.millis_since_epoch()))
    }

    /// Names of every registered metric, sorted
    pub fn metric_names(&self) -> Vec<MetricName> {
        let mut names: Vec<MetricName> =
            self.metrics.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Read every metric, sorted by name
    pub fn snapshot(&self) -> Vec<MetricSample> {
        let metrics: Vec<Arc<RegisteredMetric>> =
            self.metrics.iter().map(|entry| Arc::clone(entry.value())).collect();
        let now = self.clock.millis_since_epoch();

        let mut samples: Vec<MetricSample> = metrics
            .iter()
            .map(|metric| MetricSample { name: metric.name.clone(), value: metric.value(now) })
            .collect();
        samples.sort_by(|a, b| a.name.cmp(&b.name));
        samples
    }

    /// Close and detach every reporter
    pub fn close(&self) {
        let reporters = std::mem::take(&mut *self.reporters.write());
        for reporter in reporters {
            reporter.close();
        }
    }

    fn reporters(&self) -> Vec<Arc<dyn MetricsReporter>> {
        self.reporters.read().clone()
    }

    fn notify_change(&self, name: &MetricName) -> MetricsResult<()> {
        for reporter in self.reporters() {
            reporter.metric_change(name)?;
        }
        Ok(())
    }

    fn notify_removal(&self, name: &MetricName) -> MetricsResult<()> {
        let mut first_error = None;
        for reporter in self.reporters() {
            if let Err(err) = reporter.metric_removal(name) {
                tracing::warn!(
                    reporter = reporter.name(),
                    metric = %name,
                    error = %err,
                    "Reporter failed to drop removed metric"
                );
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
