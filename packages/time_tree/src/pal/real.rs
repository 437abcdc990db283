use std::sync::LazyLock;
use std::time::Instant;

use crate::pal::TimeSource;

pub(crate) static SYSTEM_TIME_SOURCE: SystemTimeSource = SystemTimeSource;

// Timestamps are relative to the first use so that they stay small and keep full
// `f64` precision for the lifetime of the process.
static ANCHOR: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Reads the monotonic platform clock, in seconds.
#[derive(Debug)]
pub(crate) struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[cfg_attr(test, mutants::skip)] // Real time cannot be asserted exactly.
    fn now(&self) -> f64 {
        ANCHOR.elapsed().as_secs_f64()
    }
}
