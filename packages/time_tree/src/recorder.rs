use std::borrow::Cow;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, trace};

use crate::{
    Clock, Completion, RecorderBuilder, Region, Result, Signal, Stack, Ticket, TimingNode,
    Timings, TreeState,
};

/// Accumulates a timing tree from the regions entered through it.
///
/// A recorder keeps track of which regions are currently open. Every region entered while
/// another region is open becomes a child of that region. Entering a region with the same name
/// at the same position in the tree again adds to the statistics of the existing node.
///
/// Each thread has its own recorder that the free functions ([`region()`](crate::region),
/// [`timings()`](crate::timings) and friends) use. You can also create recorders yourself and
/// pass them to the code that needs them, which keeps unrelated measurements apart even on
/// the same thread.
///
/// Cloning a recorder creates another handle to the same timing tree.
///
/// # Examples
///
/// ```
/// use time_tree::Recorder;
///
/// let recorder = Recorder::new();
///
/// {
///     let _request = recorder.region("handle_request");
///     let _query = recorder.region("query_database");
///     assert_eq!(recorder.stack().to_vec(), ["handle_request", "query_database"]);
/// }
///
/// let request = recorder.timings().get("handle_request").unwrap();
/// assert_eq!(request.count(), 1);
/// assert_eq!(request.child("query_database").unwrap().count(), 1);
/// ```
///
/// # Thread safety
///
/// This type is single-threaded. Regions, views and clones of a recorder can only be used on
/// the thread that created it.
#[derive(Clone, Debug)]
pub struct Recorder {
    state: Rc<RefCell<TreeState>>,
    clock: Clock,
    signal: Arc<Signal<Completion>>,
}

impl Recorder {
    /// Creates a recorder that uses the system clock and publishes to
    /// [`post_timing()`](crate::post_timing).
    #[expect(
        clippy::new_without_default,
        reason = "to avoid confusion with the thread-local recorder, which is what you get by default"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for a recorder with a custom configuration.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Gets replaced with itself by different name, bad mutation.
    pub fn builder() -> RecorderBuilder {
        RecorderBuilder::new()
    }

    #[must_use]
    pub(crate) fn from_parts(clock: Clock, signal: Arc<Signal<Completion>>) -> Self {
        Self {
            state: Rc::new(RefCell::new(TreeState::new())),
            clock,
            signal,
        }
    }

    /// Opens a region measured with the recorder's clock.
    ///
    /// The region is closed when the returned [`Region`] is dropped or explicitly exited.
    pub fn region(&self, name: impl Into<Cow<'static, str>>) -> Region {
        self.region_with_clock(name, self.clock.clone())
    }

    /// Opens a region measured with a specific clock.
    ///
    /// Statistics are kept in the unit of the given clock, so mixing clocks with different
    /// units for the same region produces meaningless totals.
    pub fn region_with_clock(&self, name: impl Into<Cow<'static, str>>, clock: Clock) -> Region {
        let ticket = self.state.borrow_mut().enter(name.into());

        trace!(region = %ticket.name(), depth = ticket.depth(), "entered region");

        // Read the clock last so that bookkeeping is not included in the measurement.
        let start = clock.now();

        Region::new(self.clone(), ticket, clock, start)
    }

    /// Closes a region that was opened through this recorder.
    ///
    /// On success, returns the elapsed time of the region in clock units.
    pub(crate) fn exit(&self, ticket: &Ticket, clock: &Clock, start: f64) -> Result<f64> {
        let elapsed = clock.now() - start;

        let node = self.state.borrow_mut().exit(ticket, elapsed)?;

        trace!(region = %ticket.name(), elapsed, "exited region");

        // Building the payload copies the subtree, which is wasted work if nobody listens.
        if !self.signal.is_empty() {
            let completion = {
                let state = self.state.borrow();

                let mut stack = state.stack_names();
                stack.push(ticket.name().to_string());

                Completion::new(elapsed, state.snapshot(node), stack)
            };

            // The state borrow is released so subscribers may inspect the recorder.
            self.publish(&completion);
        }

        Ok(elapsed)
    }

    fn publish(&self, completion: &Completion) {
        if !thread::panicking() {
            self.signal.publish(completion);
            return;
        }

        // A second panic while unwinding would abort the process, so we contain it.
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.signal.publish(completion)));

        if result.is_err() {
            error!(
                signal = self.signal.name(),
                region = completion.stack().last().map(String::as_str),
                "subscriber panicked while the thread was already panicking"
            );
        }
    }

    /// A live view of the regions at the current nesting level.
    ///
    /// Outside of any region, these are the top-level regions. Inside a region, these are the
    /// children of the innermost open region.
    #[must_use]
    pub fn timings(&self) -> Timings {
        Timings::new(Rc::clone(&self.state))
    }

    /// A live view of the names of the currently open regions.
    #[must_use]
    pub fn stack(&self) -> Stack {
        Stack::new(Rc::clone(&self.state))
    }

    /// Copies the whole timing tree, starting from the unnamed root.
    #[must_use]
    pub fn root(&self) -> TimingNode {
        self.state.borrow().root()
    }

    /// Discards all recorded timings and forgets all open regions.
    ///
    /// Regions that are still open when the recorder is reset fail to exit with
    /// [`Error::StaleRegion`](crate::Error::StaleRegion).
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();

        if state.depth() > 0 {
            debug!(open_regions = state.depth(), "resetting recorder with open regions");
        } else {
            debug!("resetting recorder");
        }

        state.reset();
    }

    /// The clock used for regions that do not specify their own.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The signal that completed regions are published to.
    #[must_use]
    pub fn signal(&self) -> &Arc<Signal<Completion>> {
        &self.signal
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::{Error, ManualClock};

    assert_not_impl_any!(Recorder: Send, Sync);

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn create_test_recorder(clock: &ManualClock) -> Recorder {
        Recorder::builder()
            .clock(clock.clone())
            .signal(Arc::new(Signal::new("test")))
            .build()
    }

    #[test]
    fn accumulates_repeated_regions() {
        let clock = ManualClock::starting_at(1000.0);
        let recorder = create_test_recorder(&clock);

        {
            let _a = recorder.region("a");
            clock.advance(10.0);
        }
        {
            let _a = recorder.region("a");
            clock.advance(5.0);
        }

        let a = recorder.timings().get("a").unwrap();
        assert_close(a.total_elapsed(), 15.0);
        assert_eq!(a.count(), 2);
        assert_close(a.average_elapsed(), 7.5);
    }

    #[test]
    fn nested_regions_form_tree() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        {
            let _a = recorder.region("a");
            clock.advance(1.0);
            {
                let _b = recorder.region("b");
                assert_eq!(recorder.stack().to_vec(), ["a", "b"]);
                clock.advance(2.0);
            }
        }

        let a = recorder.timings().get("a").unwrap();
        assert_close(a.total_elapsed(), 3.0);
        assert_close(a.child("b").unwrap().total_elapsed(), 2.0);
        assert!(recorder.stack().is_empty());
    }

    #[test]
    fn region_clock_overrides_recorder_clock() {
        let recorder_clock = ManualClock::new();
        let region_clock = ManualClock::starting_at(50.0);
        let recorder = create_test_recorder(&recorder_clock);

        {
            let _a = recorder.region_with_clock("a", Clock::from(&region_clock));
            recorder_clock.advance(100.0);
            region_clock.advance(3.0);
        }

        assert_close(recorder.timings().get("a").unwrap().total_elapsed(), 3.0);
    }

    #[test]
    fn publishes_completion() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);
        let received = Arc::new(Mutex::new(Vec::new()));

        recorder.signal().subscribe({
            let received = Arc::clone(&received);
            move |completion: &Completion| {
                received.lock().unwrap().push(completion.clone());
            }
        });

        {
            let _a = recorder.region("a");
            let _b = recorder.region("b");
            clock.advance(4.0);
        }

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);

        let b = received.first().unwrap();
        assert_eq!(b.stack(), ["a", "b"]);
        assert_close(b.elapsed(), 4.0);
        assert_eq!(b.node().name(), "b");
        assert_eq!(b.node().count(), 1);

        let a = received.get(1).unwrap();
        assert_eq!(a.stack(), ["a"]);
        assert!(a.node().child("b").is_some());
    }

    #[test]
    fn subscriber_panic_leaves_statistics_updated() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        recorder
            .signal()
            .subscribe(|_: &Completion| panic!("subscriber failed"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let region = recorder.region("a");
            clock.advance(2.0);
            region.exit()
        }));

        assert!(result.is_err());

        let a = recorder.timings().get("a").unwrap();
        assert_eq!(a.count(), 1);
        assert_close(a.total_elapsed(), 2.0);
        assert!(recorder.stack().is_empty());
    }

    #[test]
    fn subscriber_panic_while_unwinding_is_contained() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        recorder
            .signal()
            .subscribe(|_: &Completion| panic!("subscriber failed"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _region = recorder.region("a");
            clock.advance(2.0);
            panic!("work failed");
        }));

        // The payload is that of the original panic, the subscriber panic was swallowed.
        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"work failed"));

        let a = recorder.timings().get("a").unwrap();
        assert_eq!(a.count(), 1);
        assert_close(a.total_elapsed(), 2.0);
        assert!(recorder.stack().is_empty());
    }

    #[test]
    fn reset_clears_timings_and_stack() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);

        {
            let _a = recorder.region("a");
        }
        let open = recorder.region("b");

        recorder.reset();

        assert!(recorder.timings().is_empty());
        assert!(recorder.stack().is_empty());
        assert!(matches!(open.exit(), Err(Error::StaleRegion { .. })));
        assert!(recorder.root().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let clock = ManualClock::new();
        let recorder = create_test_recorder(&clock);
        let clone = recorder.clone();

        {
            let _a = clone.region("a");
        }

        assert!(recorder.timings().contains("a"));
    }

    #[test]
    fn separate_recorders_are_independent() {
        let clock = ManualClock::new();
        let recorder1 = create_test_recorder(&clock);
        let recorder2 = create_test_recorder(&clock);

        {
            let _a = recorder1.region("a");
        }

        assert!(recorder1.timings().contains("a"));
        assert!(recorder2.timings().is_empty());
    }
}
