//! Sensors: named recording handles feeding one or more stats.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::config::RecordingLevel;
use super::error::{MetricsError, MetricsResult};
use super::name::MetricName;
use super::stat::{Stat, StatCell};
use super::store::{Measurable, MetricStore};

/// A recording handle
///
/// Every recorded value is applied to each stat attached with [`add`].
/// A sensor removed from its store keeps accepting values, but nothing
/// reads them any more.
///
/// [`add`]: Sensor::add
#[derive(Debug)]
pub struct Sensor {
    name: String,
    level: RecordingLevel,
    enabled: bool,
    store: Weak<MetricStore>,
    stats: RwLock<Vec<(MetricName, Arc<StatCell>)>>,
}

impl Sensor {
    pub(crate) fn new(
        name: impl Into<String>,
        level: RecordingLevel,
        enabled: bool,
        store: Weak<MetricStore>,
    ) -> Self {
        Self { name: name.into(), level, enabled, store, stats: RwLock::new(Vec::new()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> RecordingLevel {
        self.level
    }

    /// Whether the store's recording level lets this sensor record
    pub fn should_record(&self) -> bool {
        self.enabled
    }

    /// Attach a stat and register it in the store under `name`
    ///
    /// Fails with [`MetricsError::DuplicateMetric`] if `name` is taken and
    /// with [`MetricsError::Detached`] once the store has been dropped.
    pub fn add(&self, name: MetricName, stat: Stat) -> MetricsResult<()> {
        let store = self
            .store
            .upgrade()
            .ok_or_else(|| MetricsError::Detached { sensor: self.name.clone() })?;

        let cell = Arc::new(StatCell::new(stat));
        store.add_metric(name.clone(), Measurable::Stat(Arc::clone(&cell)))?;
        self.stats.write().push((name, cell));
        Ok(())
    }

    /// Record a single occurrence
    pub fn record(&self) {
        self.record_value(1.0);
    }

    pub fn record_value(&self, value: f64) {
        if !self.enabled {
            return;
        }
        for (_, cell) in self.stats.read().iter() {
            cell.record(value);
        }
    }

    /// Names of the metrics fed by this sensor
    pub fn metric_names(&self) -> Vec<MetricName> {
        self.stats.read().iter().map(|(name, _)| name.clone()).collect()
    }
}
