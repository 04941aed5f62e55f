//! Tagged metric groups and the registry that hands them out.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::config::{MetricsConfig, RecordingLevel};
use super::error::{MetricsError, MetricsResult};
use super::name::{MetricGroupId, MetricName, MetricNameTemplate};
use super::sensor::Sensor;
use super::store::{MetricSample, MetricStore};
use crate::time::SharedClock;

/// Entry point of the metrics substrate
///
/// Owns the [`MetricStore`] and caches one [`MetricGroup`] per group id, so
/// asking twice for the same name and tags yields the same group.
///
/// # Example
/// ```
/// use faultline_common::metrics::{MetricsConfig, MetricsRegistry};
///
/// let registry = MetricsRegistry::new(MetricsConfig::default());
/// let group = registry
///     .group("task-error-metrics", &[("connector", "sink-1"), ("task", "0")])
///     .expect("valid group");
/// assert_eq!(group.id().to_string(), "task-error-metrics;connector=sink-1;task=0");
/// ```
#[derive(Debug)]
pub struct MetricsRegistry {
    store: Arc<MetricStore>,
    groups: DashMap<MetricGroupId, Arc<MetricGroup>>,
}

impl MetricsRegistry {
    pub fn new(config: MetricsConfig) -> Self {
        Self::from_store(MetricStore::new(config))
    }

    pub fn with_clock(config: MetricsConfig, clock: SharedClock) -> Self {
        Self::from_store(MetricStore::with_clock(config, clock))
    }

    pub fn from_store(store: Arc<MetricStore>) -> Self {
        Self { store, groups: DashMap::new() }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    /// Return the group for `group_name` and `tags`, creating it if absent
    ///
    /// Fails when the group name is empty or a tag key is empty or repeated.
    pub fn group(&self, group_name: &str, tags: &[(&str, &str)]) -> MetricsResult<Arc<MetricGroup>> {
        let id = Self::group_id(group_name, tags)?;
        let entry = self
            .groups
            .entry(id.clone())
            .or_insert_with(|| Arc::new(MetricGroup::new(id, Arc::clone(&self.store))));
        Ok(Arc::clone(entry.value()))
    }

    /// Current value of a metric
    pub fn metric_value(&self, name: &MetricName) -> Option<f64> {
        self.store.metric_value(name)
    }

    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.store.snapshot()
    }

    /// Close every reporter of the underlying store
    pub fn close(&self) {
        self.store.close();
    }

    fn group_id(group_name: &str, tags: &[(&str, &str)]) -> MetricsResult<MetricGroupId> {
        if group_name.trim().is_empty() {
            return Err(MetricsError::InvalidGroup {
                group: group_name.to_string(),
                reason: "group name must not be empty".to_string(),
            });
        }

        let mut tag_map = BTreeMap::new();
        for (key, value) in tags {
            if key.trim().is_empty() {
                return Err(MetricsError::InvalidGroup {
                    group: group_name.to_string(),
                    reason: "tag keys must not be empty".to_string(),
                });
            }
            if tag_map.insert((*key).to_string(), (*value).to_string()).is_some() {
                return Err(MetricsError::InvalidGroup {
                    group: group_name.to_string(),
                    reason: format!("tag '{key}' given more than once"),
                });
            }
        }

        Ok(MetricGroupId::new(group_name, tag_map))
    }
}

/// Metrics sharing a group name and tag set, removed together
#[derive(Debug)]
pub struct MetricGroup {
    id: MetricGroupId,
    store: Arc<MetricStore>,
    sensor_prefix: String,
    sensor_names: Mutex<BTreeSet<String>>,
}

impl MetricGroup {
    fn new(id: MetricGroupId, store: Arc<MetricStore>) -> Self {
        let sensor_prefix = format!("sensor-group:{id};");
        Self { id, store, sensor_prefix, sensor_names: Mutex::new(BTreeSet::new()) }
    }

    pub fn id(&self) -> &MetricGroupId {
        &self.id
    }

    /// Resolve a template against this group's tags
    pub fn metric_name(&self, template: &MetricNameTemplate) -> MetricsResult<MetricName> {
        let group_keys: BTreeSet<&String> = self.id.tags().keys().collect();
        let template_keys: BTreeSet<&String> = template.tags().iter().collect();

        if group_keys != template_keys {
            return Err(MetricsError::TemplateMismatch {
                template: template.name().to_string(),
                group: self.id.to_string(),
                expected: template.tags().iter().cloned().collect(),
                actual: self.id.tags().keys().cloned().collect(),
            });
        }

        Ok(MetricName::new(
            template.name(),
            self.id.group_name(),
            template.description(),
            self.id.tags().clone(),
        ))
    }

    /// Get or create a sensor scoped to this group
    pub fn sensor(&self, name: &str) -> Arc<Sensor> {
        self.sensor_with_level(name, RecordingLevel::Info)
    }

    pub fn sensor_with_level(&self, name: &str, level: RecordingLevel) -> Arc<Sensor> {
        let full_name = format!("{}{}", self.sensor_prefix, name);
        let sensor = self.store.sensor_with_level(&full_name, level);
        self.sensor_names.lock().insert(full_name);
        sensor
    }

    /// Register a metric computed on every read
    pub fn add_value_metric<F>(
        &self,
        template: &MetricNameTemplate,
        f: F,
    ) -> MetricsResult<MetricName>
    where
        F: Fn(u64) -> f64 + Send + Sync + 'static,
    {
        let name = self.metric_name(template)?;
        self.store.add_value_metric(name.clone(), f)?;
        Ok(name)
    }

    /// Names of the metrics currently registered under this group
    pub fn metric_names(&self) -> Vec<MetricName> {
        self.store.metric_names().into_iter().filter(|name| self.id.includes(name)).collect()
    }

    /// Remove every sensor and metric of this group
    ///
    /// Idempotent. Removal always runs to completion; reporter failures are
    /// gathered into a single [`MetricsError::Teardown`].
    pub fn close(&self) -> MetricsResult<()> {
        let sensor_names = std::mem::take(&mut *self.sensor_names.lock());
        let mut failures = Vec::new();

        for sensor_name in &sensor_names {
            if let Err(err) = self.store.remove_sensor(sensor_name) {
                failures.push(err.to_string());
            }
        }

        // Metrics added without a sensor, or through a collaborator
        for name in self.metric_names() {
            if let Err(err) = self.store.remove_metric(&name) {
                failures.push(err.to_string());
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MetricsError::Teardown { group: self.id.to_string(), failures })
        }
    }
}
