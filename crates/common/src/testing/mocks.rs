//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::metrics::{MetricName, MetricsError, MetricsReporter, MetricsResult};

/// Event observed by a [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    Init(usize),
    Change(MetricName),
    Removal(MetricName),
    Closed,
}

/// Reporter that records every notification and can be told to fail
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use faultline_common::metrics::{MetricStore, MetricsConfig};
/// use faultline_common::testing::RecordingReporter;
///
/// let store = MetricStore::new(MetricsConfig::default());
/// let reporter = RecordingReporter::new("capture");
/// store.add_reporter(Arc::new(reporter.clone())).unwrap();
/// assert!(reporter.changes().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RecordingReporter {
    name: String,
    events: Arc<Mutex<Vec<ReporterEvent>>>,
    fail_changes: Arc<AtomicBool>,
    fail_removals: Arc<AtomicBool>,
}

impl RecordingReporter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Arc::new(Mutex::new(Vec::new())),
            fail_changes: Arc::new(AtomicBool::new(false)),
            fail_removals: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reject every following registration
    pub fn fail_changes(&self, fail: bool) {
        self.fail_changes.store(fail, Ordering::SeqCst);
    }

    /// Fail every following removal notification
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ReporterEvent> {
        self.events.lock().clone()
    }

    pub fn changes(&self) -> Vec<MetricName> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReporterEvent::Change(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<MetricName> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReporterEvent::Removal(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.events().contains(&ReporterEvent::Closed)
    }
}

impl MetricsReporter for RecordingReporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self, existing: &[MetricName]) -> MetricsResult<()> {
        self.events.lock().push(ReporterEvent::Init(existing.len()));
        Ok(())
    }

    fn metric_change(&self, metric: &MetricName) -> MetricsResult<()> {
        if self.fail_changes.load(Ordering::SeqCst) {
            return Err(MetricsError::reporter(&self.name, metric, "registration rejected"));
        }
        self.events.lock().push(ReporterEvent::Change(metric.clone()));
        Ok(())
    }

    fn metric_removal(&self, metric: &MetricName) -> MetricsResult<()> {
        self.events.lock().push(ReporterEvent::Removal(metric.clone()));
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(MetricsError::reporter(&self.name, metric, "removal rejected"));
        }
        Ok(())
    }

    fn close(&self) {
        self.events.lock().push(ReporterEvent::Closed);
    }
}
