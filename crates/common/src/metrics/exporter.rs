//! Prometheus text exposition of the metric store.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use super::config::MetricsConfig;
use super::error::{MetricsError, MetricsResult};
use super::name::MetricName;
use super::store::MetricStore;

/// Renders the store's current values in the Prometheus text format
///
/// Each scrape builds a fresh `prometheus::Registry`, so metrics removed
/// from the store disappear from the next rendering. Every metric is
/// exported as a gauge family named `{namespace}_{group}_{name}` with its
/// tags as labels.
#[derive(Debug, Clone)]
pub struct PrometheusExporter {
    store: Arc<MetricStore>,
    namespace: String,
}

struct Family {
    label_names: Vec<String>,
    gauges: GaugeVec,
}

impl PrometheusExporter {
    pub fn new(store: Arc<MetricStore>, namespace: impl Into<String>) -> Self {
        Self { store, namespace: namespace.into() }
    }

    /// Use the namespace configured for the store
    pub fn from_store(store: Arc<MetricStore>) -> Self {
        let namespace = store.config().namespace.clone();
        Self::new(store, namespace)
    }

    pub fn from_config(store: Arc<MetricStore>, config: &MetricsConfig) -> Self {
        Self::new(store, config.namespace.clone())
    }

    /// Gather the current values as metric families
    pub fn gather(&self) -> MetricsResult<Vec<MetricFamily>> {
        let registry = Registry::new();
        let mut families: BTreeMap<String, Family> = BTreeMap::new();

        for sample in self.store.snapshot() {
            let family_name = self.family_name(&sample.name);
            let label_names: Vec<String> =
                sample.name.tags().keys().map(|key| sanitize_label(key)).collect();

            let family = match families.entry(family_name) {
                Entry::Occupied(occupied) => occupied.into_mut(),
                Entry::Vacant(vacant) => {
                    let help = if sample.name.description().is_empty() {
                        sample.name.name().to_string()
                    } else {
                        sample.name.description().to_string()
                    };
                    let labels: Vec<&str> = label_names.iter().map(String::as_str).collect();
                    let gauges = GaugeVec::new(Opts::new(vacant.key().clone(), help), &labels)?;
                    registry.register(Box::new(gauges.clone()))?;
                    vacant.insert(Family { label_names: label_names.clone(), gauges })
                }
            };

            if family.label_names != label_names {
                tracing::warn!(
                    metric = %sample.name,
                    expected = ?family.label_names,
                    actual = ?label_names,
                    "Skipping metric whose labels conflict with its family"
                );
                continue;
            }

            let values: Vec<&str> = sample.name.tags().values().map(String::as_str).collect();
            family.gauges.with_label_values(&values).set(sample.value);
        }

        Ok(registry.gather())
    }

    /// Render the current values as Prometheus text
    pub fn render(&self) -> MetricsResult<String> {
        let families = self.gather()?;
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Export(e.to_string()))
    }

    fn family_name(&self, name: &MetricName) -> String {
        let raw = if self.namespace.is_empty() {
            format!("{}_{}", name.group(), name.name())
        } else {
            format!("{}_{}_{}", self.namespace, name.group(), name.name())
        };
        sanitize_name(&raw)
    }
}

/// Map a name onto `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn sanitize_name(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
        .collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Map a tag key onto `[a-zA-Z_][a-zA-Z0-9_]*`, avoiding the reserved `__`
/// prefix
fn sanitize_label(raw: &str) -> String {
    let mut out: String =
        raw.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    while out.starts_with("__") {
        out.remove(0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(
            sanitize_name("connect_task-error-metrics_total-retries"),
            "connect_task_error_metrics_total_retries"
        );
        assert_eq!(sanitize_name("1abc"), "_1abc");
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("connector"), "connector");
        assert_eq!(sanitize_label("worker-id"), "worker_id");
        assert_eq!(sanitize_label("__internal"), "_internal");
        assert_eq!(sanitize_label("0task"), "_0task");
    }
}
