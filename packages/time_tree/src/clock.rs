use std::sync::Arc;

use crate::ManualClock;
use crate::pal::{TimeSource, TimeSourceFacade};

/// Supplies the timestamps that region elapsed times are calculated from.
///
/// All statistics derived from a clock are in the clock's unit. The default clock
/// ([`Clock::system()`]) returns seconds from the monotonic platform clock. If regions nested
/// inside each other use clocks with different units, the resulting tree mixes those units
/// and it is up to the caller to make sense of that.
///
/// Cloning a clock is cheap and the clone reads the same time source.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// use time_tree::Clock;
///
/// static TICKS: AtomicU64 = AtomicU64::new(0);
///
/// // Every read advances the clock by one tick.
/// let clock = Clock::from_fn(|| TICKS.fetch_add(1, Ordering::Relaxed) as f64);
///
/// let first = clock.now();
/// let second = clock.now();
/// assert!(second > first);
/// ```
#[derive(Clone, Debug)]
pub struct Clock {
    source: TimeSourceFacade,
}

impl Clock {
    /// Creates a clock that reads the monotonic platform clock, in seconds.
    #[must_use]
    pub fn system() -> Self {
        Self {
            source: TimeSourceFacade::system(),
        }
    }

    /// Creates a clock that calls `f` whenever it needs the current time.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self {
            source: TimeSourceFacade::Function(Arc::new(f)),
        }
    }

    /// Gets the current timestamp.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.source.now()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl From<ManualClock> for Clock {
    fn from(value: ManualClock) -> Self {
        Self {
            source: TimeSourceFacade::Manual(value),
        }
    }
}

impl From<&ManualClock> for Clock {
    fn from(value: &ManualClock) -> Self {
        Self::from(value.clone())
    }
}
