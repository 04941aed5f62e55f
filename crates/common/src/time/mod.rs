//! Time abstractions
//!
//! The metrics store and the error metrics registry read wall-clock time
//! through the [`Clock`] trait so tests can pin timestamps with
//! [`MockClock`] instead of sleeping.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use faultline_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_millis(1_000);
//! clock.advance(Duration::from_millis(250));
//! assert_eq!(clock.millis_since_epoch(), 1_250);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SharedClock, SystemClock};
