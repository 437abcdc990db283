use std::sync::{Arc, LazyLock};
use std::thread::{self, ThreadId};

use crate::{Signal, TimingNode};

static POST_TIMING: LazyLock<Arc<Signal<Completion>>> =
    LazyLock::new(|| Arc::new(Signal::new("post timing")));

/// The process-wide signal that announces every completed region.
///
/// Recorders publish to this signal unless they were built with a different one via
/// [`RecorderBuilder::signal()`](crate::RecorderBuilder::signal). Subscribers are called on
/// the thread whose region completed, after the statistics of the region have been updated.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use time_tree::{post_timing, region};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let me = std::thread::current().id();
///
/// let subscriber = post_timing().subscribe({
///     let seen = Arc::clone(&seen);
///     move |completion| {
///         // Other threads may be timing regions at the same time.
///         if completion.thread() == me {
///             seen.lock().unwrap().push(completion.stack().to_vec());
///         }
///     }
/// });
///
/// {
///     let _outer = region("outer");
///     let _inner = region("inner");
/// }
///
/// post_timing().unsubscribe(&subscriber);
///
/// assert_eq!(
///     *seen.lock().unwrap(),
///     vec![vec!["outer", "inner"], vec!["outer"]]
/// );
/// ```
#[must_use]
pub fn post_timing() -> &'static Arc<Signal<Completion>> {
    &POST_TIMING
}

/// Describes a region that has just completed.
///
/// This is the value published via [`post_timing()`] after each region exit.
#[derive(Clone, Debug)]
pub struct Completion {
    elapsed: f64,
    node: TimingNode,
    stack: Vec<String>,
    thread: ThreadId,
}

impl Completion {
    #[must_use]
    pub(crate) fn new(elapsed: f64, node: TimingNode, stack: Vec<String>) -> Self {
        Self {
            elapsed,
            node,
            stack,
            thread: thread::current().id(),
        }
    }

    /// Elapsed time of the run that just completed, in clock units.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Accumulated statistics of the region, including the run that just completed.
    #[must_use]
    pub fn node(&self) -> &TimingNode {
        &self.node
    }

    /// Names of the regions that were open when the region completed, outermost first.
    ///
    /// The last entry is the name of the completed region itself.
    #[must_use]
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// The thread on which the region completed.
    #[must_use]
    pub fn thread(&self) -> ThreadId {
        self.thread
    }
}
