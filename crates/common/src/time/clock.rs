//! Wall-clock sources for metric timestamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Shared, type-erased clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Source of wall-clock time
///
/// Only wall time is needed: metric values are stamped in milliseconds since
/// the UNIX epoch, never measured as elapsed durations.
pub trait Clock: Send + Sync {
    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Get milliseconds since UNIX epoch
    ///
    /// Times before the epoch collapse to `0`; times past `u64::MAX`
    /// milliseconds saturate.
    fn millis_since_epoch(&self) -> u64 {
        let millis = self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }

    fn millis_since_epoch(&self) -> u64 {
        (**self).millis_since_epoch()
    }
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Mock clock for deterministic testing
///
/// Holds an absolute millisecond timestamp. Clones share the same
/// underlying time, so a clone handed to a registry moves when the test
/// advances the original.
///
/// ```rust
/// use std::time::Duration;
///
/// use faultline_common::time::{Clock, MockClock};
///
/// let clock = MockClock::at_millis(42);
/// let handle = clock.clone();
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(handle.millis_since_epoch(), 1_042);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    millis: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a mock clock pinned to the current real time
    pub fn new() -> Self {
        Self::at_millis(SystemClock.millis_since_epoch())
    }

    /// Create a mock clock pinned to `millis` since the UNIX epoch
    pub fn at_millis(millis: u64) -> Self {
        Self { millis: Arc::new(AtomicU64::new(millis)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        let delta = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    /// Set the mock clock to an absolute timestamp
    pub fn set_millis(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }

    fn millis_since_epoch(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for time::clock.
    use super::*;

    #[test]
    fn test_system_clock_millis() {
        let clock = SystemClock;
        let millis = clock.millis_since_epoch();
        assert!(millis > 0);
    }

    /// Validates `MockClock::at_millis` behavior for the advance scenario.
    ///
    /// Assertions:
    /// - Confirms `clock.millis_since_epoch()` equals `5_100`.
    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::at_millis(100);
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.millis_since_epoch(), 5_100);
    }

    #[test]
    fn test_mock_clock_set_millis() {
        let clock = MockClock::at_millis(100);
        clock.set_millis(7);
        assert_eq!(clock.millis_since_epoch(), 7);
        assert_eq!(clock.system_time(), UNIX_EPOCH + Duration::from_millis(7));
    }

    /// Validates that clones share the same time source.
    #[test]
    fn test_mock_clock_clone_shares_time() {
        let clock1 = MockClock::at_millis(0);
        let clock2 = clock1.clone();

        clock1.advance(Duration::from_millis(15));
        assert_eq!(clock2.millis_since_epoch(), 15);
    }

    #[test]
    fn test_shared_clock_delegates() {
        let mock = MockClock::at_millis(9);
        let shared: SharedClock = Arc::new(mock.clone());
        mock.advance(Duration::from_millis(1));
        assert_eq!(shared.millis_since_epoch(), 10);
    }
}
