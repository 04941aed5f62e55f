//! Integration tests for Prometheus exposition of the metric store.

#![cfg(feature = "runtime")]

use std::sync::Arc;

use faultline_common::metrics::{
    MetricNameTemplate, MetricsConfig, MetricsRegistry, PrometheusExporter, Stat,
};
use faultline_common::time::MockClock;

fn template(name: &str, description: &str) -> MetricNameTemplate {
    MetricNameTemplate::new(name, "task-error-metrics", description, ["connector", "task"])
}

/// Validates counters and value metrics render as labelled gauge families.
///
/// Assertions:
/// - Confirms family names are namespaced and sanitized.
/// - Confirms the description becomes the help text.
/// - Confirms each task renders its own labelled series.
#[test]
fn test_render_labelled_families() {
    let clock = MockClock::at_millis(1_700_000_000_000);
    let registry = MetricsRegistry::with_clock(MetricsConfig::default(), Arc::new(clock));

    for task in ["0", "1"] {
        let group = registry
            .group("task-error-metrics", &[("connector", "sink-1"), ("task", task)])
            .expect("group");
        let sensor = group.sensor("total-retries");
        sensor
            .add(
                group
                    .metric_name(&template("total-retries", "The number of operations retried."))
                    .expect("name"),
                Stat::CumulativeSum,
            )
            .expect("stat");
        sensor.record();
    }

    let group = registry
        .group("task-error-metrics", &[("connector", "sink-1"), ("task", "0")])
        .expect("group");
    group.add_value_metric(&template("last-error-timestamp", ""), |now| now as f64).expect("gauge");

    let exporter = PrometheusExporter::from_store(Arc::clone(registry.store()));
    let text = exporter.render().expect("render");

    assert!(text.contains("# HELP connect_task_error_metrics_total_retries The number of operations retried."));
    assert!(text.contains("# TYPE connect_task_error_metrics_total_retries gauge"));
    assert!(text.contains("connect_task_error_metrics_total_retries{connector=\"sink-1\",task=\"0\"} 1"));
    assert!(text.contains("connect_task_error_metrics_total_retries{connector=\"sink-1\",task=\"1\"} 1"));
    // Empty descriptions fall back to the metric name.
    assert!(text.contains("# HELP connect_task_error_metrics_last_error_timestamp last-error-timestamp"));
}

#[test]
fn test_removed_metrics_disappear_from_next_render() {
    let registry = MetricsRegistry::new(MetricsConfig::default());
    let group = registry
        .group("task-error-metrics", &[("connector", "c"), ("task", "0")])
        .expect("group");
    group.add_value_metric(&template("probe", "probe"), |_| 1.0).expect("probe");

    let exporter = PrometheusExporter::new(Arc::clone(registry.store()), "");
    assert!(exporter.render().expect("first render").contains("task_error_metrics_probe"));

    group.close().expect("close");
    assert!(exporter.gather().expect("second gather").is_empty());
}

/// Validates that a metric whose tag keys disagree with its family is skipped
/// instead of failing the whole scrape.
#[test]
fn test_conflicting_labels_are_skipped() {
    let registry = MetricsRegistry::new(MetricsConfig::default());
    let with_task = registry
        .group("shared", &[("connector", "c"), ("task", "0")])
        .expect("group");
    let connector_only = registry.group("shared", &[("connector", "d")]).expect("group");

    with_task
        .add_value_metric(&MetricNameTemplate::new("x", "shared", "x", ["connector", "task"]), |_| 1.0)
        .expect("x with task");
    connector_only
        .add_value_metric(&MetricNameTemplate::new("x", "shared", "x", ["connector"]), |_| 2.0)
        .expect("x without task");

    let families = PrometheusExporter::new(Arc::clone(registry.store()), "connect")
        .gather()
        .expect("gather");
    assert_eq!(families.len(), 1);
    assert_eq!(families[0].get_metric().len(), 1);
}
