//! Lock-free measurable statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Accumulation function applied to recorded values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// Running sum of every recorded value
    CumulativeSum,
    /// Number of recordings, regardless of value
    CumulativeCount,
    /// Last recorded value
    Value,
}

/// Atomic storage for one stat
///
/// The value is kept as `f64` bits in an `AtomicU64`; sums use a
/// compare-and-swap loop so concurrent recordings are never lost.
#[derive(Debug)]
pub struct StatCell {
    stat: Stat,
    bits: AtomicU64,
}

impl StatCell {
    pub fn new(stat: Stat) -> Self {
        Self { stat, bits: AtomicU64::new(0.0_f64.to_bits()) }
    }

    pub fn stat(&self) -> Stat {
        self.stat
    }

    /// Record one value
    pub fn record(&self, value: f64) {
        match self.stat {
            Stat::CumulativeSum => self.add(value),
            Stat::CumulativeCount => self.add(1.0),
            Stat::Value => self.bits.store(value.to_bits(), Ordering::Release),
        }
    }

    /// Current value
    pub fn measure(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    fn add(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_cumulative_sum_adds_values() {
        let cell = StatCell::new(Stat::CumulativeSum);
        cell.record(1.0);
        cell.record(2.5);
        assert!((cell.measure() - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cumulative_count_ignores_value() {
        let cell = StatCell::new(Stat::CumulativeCount);
        cell.record(10.0);
        cell.record(-3.0);
        assert!((cell.measure() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_value_keeps_last() {
        let cell = StatCell::new(Stat::Value);
        cell.record(4.0);
        cell.record(2.0);
        assert!((cell.measure() - 2.0).abs() < f64::EPSILON);
    }

    /// Validates that concurrent sums do not lose updates.
    ///
    /// Assertions:
    /// - Confirms the cell reads exactly `threads * per_thread`.
    #[test]
    fn test_cumulative_sum_is_exact_under_contention() {
        let cell = Arc::new(StatCell::new(Stat::CumulativeSum));
        let threads = 8;
        let per_thread = 5_000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..per_thread {
                        cell.record(1.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("recording thread panicked");
        }

        assert!((cell.measure() - f64::from(threads * per_thread)).abs() < f64::EPSILON);
    }
}
