// Error types for the metrics substrate
use thiserror::Error;

use crate::error::{CommonError, ErrorSeverity};
use crate::{impl_error_classification, impl_error_conversion};

/// Errors raised while registering, removing or exporting metrics
#[derive(Debug, Error)]
pub enum MetricsError {
    // Configuration, validation and I/O problems handled by CommonError
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Metric '{name}' is already registered")]
    DuplicateMetric { name: String },

    #[error("Invalid metric group '{group}': {reason}")]
    InvalidGroup { group: String, reason: String },

    #[error("Template '{template}' expects tags {expected:?} but group '{group}' has {actual:?}")]
    TemplateMismatch {
        template: String,
        group: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Reporter '{reporter}' failed on '{metric}': {message}")]
    Reporter { reporter: String, metric: String, message: String },

    #[error("Sensor '{sensor}' is no longer attached to a metric store")]
    Detached { sensor: String },

    #[error("Failed to remove {} metric(s) of group '{group}': {}", failures.len(), failures.join("; "))]
    Teardown { group: String, failures: Vec<String> },

    #[error("Metrics exposition failed: {0}")]
    Export(String),
}

impl MetricsError {
    /// Create a reporter failure
    pub fn reporter(
        reporter: impl Into<String>,
        metric: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::Reporter {
            reporter: reporter.into(),
            metric: metric.to_string(),
            message: message.into(),
        }
    }
}

impl From<prometheus::Error> for MetricsError {
    fn from(err: prometheus::Error) -> Self {
        Self::Export(err.to_string())
    }
}

// Auto-convert std types via CommonError
impl_error_conversion!(MetricsError, Common);

impl_error_classification!(MetricsError, Common,
    Self::DuplicateMetric { .. } => {
        retryable: false,  // Pre-clear the group instead
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::InvalidGroup { .. } | Self::TemplateMismatch { .. } => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::Reporter { .. } | Self::Teardown { .. } => {
        retryable: false,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::Detached { .. } => {
        retryable: false,
        severity: ErrorSeverity::Info,
        critical: false,
    },
    Self::Export(_) => {
        retryable: true,  // The next scrape renders a fresh registry
        severity: ErrorSeverity::Warning,
        critical: false,
    }
);

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
