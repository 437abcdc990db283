use std::thread;

use tracing::error;

use crate::{Clock, Recorder, Result, Ticket};

/// A named region of code that is measured from creation until it is dropped or exited.
///
/// Create regions via [`region()`](crate::region) for the thread-local recorder or via
/// [`Recorder::region()`] for a specific recorder.
///
/// The region is closed exactly once: either explicitly via [`exit()`](Self::exit) or
/// implicitly when the value is dropped, which also happens when the code inside the region
/// panics. Closing the region adds the elapsed time to its node in the timing tree and then
/// publishes a [`Completion`](crate::Completion).
///
/// # Nesting
///
/// Regions must be closed in the reverse order of opening. Keeping each region in its own
/// scope guarantees this. If a region is closed while a region opened after it is still open,
/// or after its recorder was reset, closing fails: [`exit()`](Self::exit) returns an error
/// and dropping the region panics (or logs an error if the thread is already panicking).
///
/// # Examples
///
/// ```
/// use time_tree::{region, reset, timings};
///
/// reset();
///
/// fn parse(input: &str) -> usize {
///     let _region = region("parse");
///     input.split_whitespace().count()
/// }
///
/// parse("a b c");
/// parse("d e");
///
/// assert_eq!(timings().get("parse").unwrap().count(), 2);
/// ```
#[derive(Debug)]
#[must_use = "Measurements are taken between creation and drop"]
pub struct Region {
    recorder: Recorder,
    ticket: Ticket,
    clock: Clock,
    start: f64,
    exited: bool,
}

impl Region {
    pub(crate) fn new(recorder: Recorder, ticket: Ticket, clock: Clock, start: f64) -> Self {
        Self {
            recorder,
            ticket,
            clock,
            start,
            exited: false,
        }
    }

    /// The name of the region.
    #[must_use]
    pub fn name(&self) -> &str {
        self.ticket.name()
    }

    /// Time elapsed since the region was entered, in clock units.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.clock.now() - self.start
    }

    /// Closes the region and returns its elapsed time in clock units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnbalancedExit`](crate::Error::UnbalancedExit) if this is not the
    /// innermost open region of its recorder, and
    /// [`Error::StaleRegion`](crate::Error::StaleRegion) if the recorder was reset after the
    /// region was entered. The timing tree is not modified in either case, and after an
    /// out-of-order exit the region stays open on the stack until the recorder is reset.
    ///
    /// # Panics
    ///
    /// Panics raised by subscribers of the completion signal propagate to the caller. The
    /// statistics of the region have already been updated at that point.
    pub fn exit(mut self) -> Result<f64> {
        self.exited = true;
        self.recorder.exit(&self.ticket, &self.clock, self.start)
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if self.exited {
            return;
        }

        self.exited = true;

        if let Err(e) = self.recorder.exit(&self.ticket, &self.clock, self.start) {
            if thread::panicking() {
                error!(error = %e, "failed to exit region while unwinding");
            } else {
                panic!("{e}");
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::{Error, ManualClock, Signal};

    assert_not_impl_any!(Region: Send, Sync);

    fn create_test_recorder(clock: &ManualClock) -> Recorder {
        Recorder::builder()
            .clock(clock.clone())
            .signal(Arc::new(Signal::new("test")))
            .build()
    }

    #[test]
    fn exit_returns_elapsed() {
        let clock = ManualClock::starting_at(1000.0);
        let recorder = create_test_recorder(&clock);

        let region = recorder.region("a");
        assert_eq!(region.name(), "a");

        clock.advance(10.0);
        assert!((region.elapsed() - 10.0).abs() < f64::EPSILON);

        let elapsed = region.exit().unwrap();
        assert!((elapsed - 10.0).abs() < f64::EPSILON);
        assert_eq!(recorder.timings().get("a").unwrap().count(), 1);
    }

    #[test]
    fn explicit_exit_is_not_repeated_on_drop() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        recorder.region("a").exit().unwrap();

        assert_eq!(recorder.timings().get("a").unwrap().count(), 1);
    }

    #[test]
    fn drop_exits_when_code_panics() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _region = recorder.region("a");
            clock.advance(3.0);
            panic!("work failed");
        }));

        assert!(result.is_err());
        assert!(recorder.stack().is_empty());

        let a = recorder.timings().get("a").unwrap();
        assert_eq!(a.count(), 1);
        assert!((a.total_elapsed() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_order_exit_is_an_error() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        let outer = recorder.region("outer");
        let inner = recorder.region("inner");

        let error = outer.exit().unwrap_err();
        assert!(matches!(error, Error::UnbalancedExit { .. }));

        inner.exit().unwrap();

        // The failed exit did not record anything and left the outer region open.
        assert_eq!(recorder.stack().to_vec(), ["outer"]);
        assert_eq!(recorder.timings().names(), ["inner"]);
        assert_eq!(recorder.root().child("outer").unwrap().count(), 0);
    }

    #[test]
    #[should_panic(expected = "exited out of order")]
    fn out_of_order_drop_panics() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        let outer = recorder.region("outer");
        let _inner = recorder.region("inner");

        drop(outer);
    }

    #[test]
    fn exit_after_reset_is_an_error() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        let region = recorder.region("a");
        recorder.reset();

        assert!(matches!(region.exit(), Err(Error::StaleRegion { .. })));
        assert!(recorder.timings().is_empty());
    }

    #[test]
    fn failed_exit_while_unwinding_does_not_abort() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _region = recorder.region("a");
            recorder.reset();
            panic!("work failed");
        }));

        assert!(result.is_err());
        assert!(recorder.timings().is_empty());
    }
}
