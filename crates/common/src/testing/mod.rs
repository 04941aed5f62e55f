//! Testing utilities and helpers
//!
//! - **[`mocks`]**: a [`RecordingReporter`] that captures metric
//!   registrations and removals and can inject reporter failures
//!
//! Deterministic time lives in [`crate::time::MockClock`].

pub mod mocks;

pub use mocks::{RecordingReporter, ReporterEvent};
