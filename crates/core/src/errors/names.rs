//! Metric names of the task error group

use faultline_common::metrics::MetricNameTemplate;

use crate::config::ErrorMetricsConfig;

pub const GROUP_NAME: &str = "task-error-metrics";
pub const CONNECTOR_TAG: &str = "connector";
pub const TASK_TAG: &str = "task";

pub const TOTAL_RECORD_FAILURES: &str = "total-record-failures";
pub const TOTAL_RECORD_ERRORS: &str = "total-record-errors";
pub const TOTAL_RECORDS_SKIPPED: &str = "total-records-skipped";
pub const TOTAL_RETRIES: &str = "total-retries";
pub const TOTAL_ERRORS_LOGGED: &str = "total-errors-logged";
pub const DEADLETTERQUEUE_PRODUCE_REQUESTS: &str = "deadletterqueue-produce-requests";
pub const DEADLETTERQUEUE_PRODUCE_FAILURES: &str = "deadletterqueue-produce-failures";
pub const LAST_ERROR_TIMESTAMP: &str = "last-error-timestamp";

/// Templates for the seven counters and the last-error gauge
///
/// Every template carries the configured group name and the connector and
/// task tag keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMetricNames {
    pub record_failures: MetricNameTemplate,
    pub record_errors: MetricNameTemplate,
    pub records_skipped: MetricNameTemplate,
    pub retries: MetricNameTemplate,
    pub errors_logged: MetricNameTemplate,
    pub dead_letter_queue_produce_requests: MetricNameTemplate,
    pub dead_letter_queue_produce_failures: MetricNameTemplate,
    pub last_error_timestamp: MetricNameTemplate,
}

impl ErrorMetricNames {
    pub fn new(config: &ErrorMetricsConfig) -> Self {
        let template = |name: &str, description: &str| {
            MetricNameTemplate::new(
                name,
                config.group_name.as_str(),
                description,
                [config.connector_tag.as_str(), config.task_tag.as_str()],
            )
        };

        Self {
            record_failures: template(
                TOTAL_RECORD_FAILURES,
                "The number of record processing failures in this task.",
            ),
            record_errors: template(
                TOTAL_RECORD_ERRORS,
                "The number of record processing errors in this task.",
            ),
            records_skipped: template(
                TOTAL_RECORDS_SKIPPED,
                "The number of records skipped due to errors.",
            ),
            retries: template(TOTAL_RETRIES, "The number of operations retried."),
            errors_logged: template(TOTAL_ERRORS_LOGGED, "The number of errors that were logged."),
            dead_letter_queue_produce_requests: template(
                DEADLETTERQUEUE_PRODUCE_REQUESTS,
                "The number of attempted writes to the dead letter queue.",
            ),
            dead_letter_queue_produce_failures: template(
                DEADLETTERQUEUE_PRODUCE_FAILURES,
                "The number of failed writes to the dead letter queue.",
            ),
            last_error_timestamp: template(
                LAST_ERROR_TIMESTAMP,
                "The epoch timestamp when this task last encountered an error.",
            ),
        }
    }

    /// The counter templates, in registration order
    pub fn counters(&self) -> [&MetricNameTemplate; 7] {
        [
            &self.record_failures,
            &self.record_errors,
            &self.records_skipped,
            &self.retries,
            &self.errors_logged,
            &self.dead_letter_queue_produce_requests,
            &self.dead_letter_queue_produce_failures,
        ]
    }

    /// Every template: the counters followed by the gauge
    pub fn all(&self) -> Vec<&MetricNameTemplate> {
        let mut all = self.counters().to_vec();
        all.push(&self.last_error_timestamp);
        all
    }
}

impl Default for ErrorMetricNames {
    fn default() -> Self {
        Self::new(&ErrorMetricsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_names_are_distinct() {
        let names = ErrorMetricNames::default();
        let distinct: BTreeSet<&str> = names.all().iter().map(|t| t.name()).collect();
        assert_eq!(distinct.len(), 8);
    }

    #[test]
    fn test_templates_follow_config() {
        let config = ErrorMetricsConfig {
            group_name: "sink-errors".to_string(),
            connector_tag: "pipeline".to_string(),
            task_tag: "worker".to_string(),
        };
        let names = ErrorMetricNames::new(&config);

        for template in names.all() {
            assert_eq!(template.group(), "sink-errors");
            let tags: Vec<&str> = template.tags().iter().map(String::as_str).collect();
            assert_eq!(tags, vec!["pipeline", "worker"]);
        }
    }

    #[test]
    fn test_descriptions() {
        let names = ErrorMetricNames::default();
        assert_eq!(names.retries.description(), "The number of operations retried.");
        assert_eq!(
            names.last_error_timestamp.description(),
            "The epoch timestamp when this task last encountered an error."
        );
    }
}
