use std::sync::Arc;

use crate::{Clock, Completion, Recorder, Signal, post_timing};

/// Creates instances of [`Recorder`] with a custom configuration.
///
/// All parameters are optional:
/// * `clock` - defaults to [`Clock::system()`]
/// * `signal` - defaults to [`post_timing()`]
///
/// Use `Recorder::builder()` to create a new instance of this builder.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use time_tree::{ManualClock, Recorder, Signal};
///
/// let clock = ManualClock::new();
///
/// // A private signal keeps completions of this recorder away from global subscribers.
/// let recorder = Recorder::builder()
///     .clock(clock.clone())
///     .signal(Arc::new(Signal::new("private")))
///     .build();
///
/// {
///     let _work = recorder.region("work");
///     clock.advance(2.0);
/// }
///
/// let work = recorder.timings().get("work").unwrap();
/// assert!((work.total_elapsed() - 2.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Default)]
pub struct RecorderBuilder {
    clock: Option<Clock>,
    signal: Option<Arc<Signal<Completion>>>,
}

impl RecorderBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the clock used by regions that do not specify their own.
    #[must_use]
    pub fn clock(self, clock: impl Into<Clock>) -> Self {
        Self {
            clock: Some(clock.into()),
            ..self
        }
    }

    /// Sets the signal that completed regions are published to.
    #[must_use]
    pub fn signal(self, signal: Arc<Signal<Completion>>) -> Self {
        Self {
            signal: Some(signal),
            ..self
        }
    }

    /// Creates the recorder.
    #[must_use]
    pub fn build(self) -> Recorder {
        Recorder::from_parts(
            self.clock.unwrap_or_default(),
            self.signal
                .unwrap_or_else(|| Arc::clone(post_timing())),
        )
    }
}
