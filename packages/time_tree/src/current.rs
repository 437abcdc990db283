//! Operations on the recorder of the current thread.

use std::borrow::Cow;

use crate::{Clock, Recorder, Region, Stack, Timings};

thread_local! {
    static CURRENT: Recorder = Recorder::new();
}

/// Gets a handle to the recorder of the current thread.
///
/// The recorder is created on first use with the system clock and publishes to
/// [`post_timing()`](crate::post_timing). Every thread has its own.
#[must_use]
pub fn current_recorder() -> Recorder {
    CURRENT.with(Recorder::clone)
}

/// Opens a region in the recorder of the current thread.
///
/// See [`Recorder::region()`].
pub fn region(name: impl Into<Cow<'static, str>>) -> Region {
    current_recorder().region(name)
}

/// Opens a region measured with a specific clock in the recorder of the current thread.
///
/// See [`Recorder::region_with_clock()`].
pub fn region_with_clock(name: impl Into<Cow<'static, str>>, clock: Clock) -> Region {
    current_recorder().region_with_clock(name, clock)
}

/// A live view of the regions at the current nesting level of the current thread.
///
/// See [`Recorder::timings()`].
#[must_use]
pub fn timings() -> Timings {
    current_recorder().timings()
}

/// A live view of the names of the regions currently open on the current thread.
///
/// See [`Recorder::stack()`].
#[must_use]
pub fn stack() -> Stack {
    current_recorder().stack()
}

/// Discards everything recorded on the current thread.
///
/// Other threads are not affected. See [`Recorder::reset()`].
pub fn reset() {
    current_recorder().reset();
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use super::*;
    use crate::{ManualClock, Timed, post_timing};

    #[test]
    fn starts_empty_on_new_thread() {
        thread::spawn(|| {
            assert!(timings().is_empty());
            assert!(stack().is_empty());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn reset_without_regions_is_harmless() {
        reset();
        reset();

        assert!(timings().is_empty());
        assert!(stack().is_empty());
    }

    #[test]
    fn records_into_thread_local_recorder() {
        reset();

        let clock = ManualClock::starting_at(1000.0);

        {
            let _a = region_with_clock("a", Clock::from(&clock));
            clock.advance(10.0);
        }
        {
            let _a = region_with_clock("a", Clock::from(&clock));
            clock.advance(5.0);
        }

        let a = timings().get("a").unwrap();
        assert_eq!(a.count(), 2);
        assert!((a.total_elapsed() - 15.0).abs() < f64::EPSILON);
        assert!((a.average_elapsed() - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn stack_inside_nested_regions() {
        reset();

        let _a = region("a");
        let _b = region("b");

        assert_eq!(stack().to_vec(), ["a", "b"]);
    }

    #[test]
    fn reset_clears_current_thread() {
        {
            let _a = region("a");
        }
        assert!(!timings().is_empty());

        reset();

        assert!(timings().is_empty());
        assert!(stack().is_empty());
    }

    #[test]
    fn threads_do_not_share_recorder() {
        reset();

        {
            let _here = region("here");
        }

        let seen_on_other_thread = thread::spawn(|| timings().names())
            .join()
            .unwrap();

        assert!(seen_on_other_thread.is_empty());
        assert!(timings().contains("here"));
    }

    #[test]
    fn subscriber_can_read_thread_local_state() {
        reset();

        let me = thread::current().id();
        let observed = Arc::new(Mutex::new(Vec::new()));

        let subscriber = post_timing().subscribe({
            let observed = Arc::clone(&observed);
            move |completion| {
                if completion.thread() == me {
                    // The subscriber runs on the completing thread after the region was popped.
                    observed.lock().unwrap().push(stack().to_vec());
                }
            }
        });

        {
            let _outer = region("outer");
            let _inner = region("inner");
        }

        post_timing().unsubscribe(&subscriber);

        assert_eq!(
            *observed.lock().unwrap(),
            vec![vec!["outer".to_string()], Vec::new()]
        );
    }

    #[test]
    fn timed_wrapper_uses_thread_local_recorder() {
        reset();

        let clock = ManualClock::new();
        let mut work = Timed::new().name("work").clock(clock.clone()).wrap({
            let clock = clock.clone();
            move || clock.advance(2.0)
        });

        work();
        work();

        let node = timings().get("work").unwrap();
        assert_eq!(node.count(), 2);
        assert!((node.total_elapsed() - 4.0).abs() < f64::EPSILON);
    }
}
