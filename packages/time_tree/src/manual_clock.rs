use std::sync::{Arc, Mutex};

use crate::ERR_POISONED_LOCK;
use crate::pal::TimeSource;

/// A clock that only moves when told to.
///
/// Clones of the same `ManualClock` share the same time value, so a test can hand one clone to
/// a [`Recorder`](crate::Recorder) or [`Timed`](crate::Timed) wrapper and advance time through
/// another while the measured code runs.
///
/// # Examples
///
/// ```
/// use time_tree::{Clock, ManualClock};
///
/// let manual = ManualClock::starting_at(1000.0);
/// let clock = Clock::from(manual.clone());
///
/// manual.advance(10.0);
/// assert!((clock.now() - 1010.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    time: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Creates a clock that starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock that starts at the given timestamp.
    #[must_use]
    pub fn starting_at(time: f64) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    /// Moves the clock forward by `by` units.
    ///
    /// This affects all clones of this clock.
    pub fn advance(&self, by: f64) {
        *self.time.lock().expect(ERR_POISONED_LOCK) += by;
    }

    /// Sets the clock to an explicit timestamp.
    ///
    /// This affects all clones of this clock.
    pub fn set(&self, time: f64) {
        *self.time.lock().expect(ERR_POISONED_LOCK) = time;
    }

    /// Gets the current timestamp of the clock.
    #[must_use]
    pub fn now(&self) -> f64 {
        *self.time.lock().expect(ERR_POISONED_LOCK)
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        Self::now(self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(ManualClock: Send, Sync);

    fn assert_time(clock: &ManualClock, expected: f64) {
        let actual = clock.now();
        assert!(
            (actual - expected).abs() < f64::EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn starts_at_zero() {
        assert_time(&ManualClock::new(), 0.0);
    }

    #[test]
    fn starts_at_given_time() {
        assert_time(&ManualClock::starting_at(1000.0), 1000.0);
    }

    #[test]
    fn advance_accumulates() {
        let clock = ManualClock::starting_at(1000.0);
        clock.advance(10.0);
        clock.advance(5.0);

        assert_time(&clock, 1015.0);
    }

    #[test]
    fn set_overrides_time() {
        let clock = ManualClock::starting_at(1000.0);
        clock.set(3.5);

        assert_time(&clock, 3.5);
    }

    #[test]
    fn clones_share_time() {
        let clock1 = ManualClock::new();
        let clock2 = clock1.clone();

        clock1.advance(7.0);
        assert_time(&clock2, 7.0);

        clock2.set(1.0);
        assert_time(&clock1, 1.0);
    }
}
