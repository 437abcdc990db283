//! Live views of the state of a recorder.
//!
//! The views hold on to the recorder state instead of copying it, so every query returns the
//! data as it is at the time of the query, even if the view was obtained long before.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::{TimingNode, TreeState};

/// Live view of the regions at the current nesting level of a recorder.
///
/// Outside of any region, these are the top-level regions. Inside a region, these are the
/// children of the innermost open region. Which level that is gets decided anew on each
/// query.
///
/// Obtain via [`timings()`](crate::timings) or [`Recorder::timings()`](crate::Recorder::timings).
///
/// # Examples
///
/// ```
/// use time_tree::Recorder;
///
/// let recorder = Recorder::new();
/// let timings = recorder.timings();
/// assert!(timings.is_empty());
///
/// {
///     let _load = recorder.region("load");
/// }
///
/// // The same view now sees the completed region.
/// assert!(timings.contains("load"));
/// ```
pub struct Timings {
    state: Rc<RefCell<TreeState>>,
}

impl Timings {
    pub(crate) fn new(state: Rc<RefCell<TreeState>>) -> Self {
        Self { state }
    }

    /// Copies the statistics of the region with the given name, including its subtree.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TimingNode> {
        self.state.borrow().current_child(name)
    }

    /// Whether a region with the given name has been entered at this level.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.state.borrow().has_current_child(name)
    }

    /// Names of the regions at this level, in ascending order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.state.borrow().current_child_names()
    }

    /// Number of regions at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().current_child_count()
    }

    /// Whether no regions have been entered at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies all regions at this level, including their subtrees.
    ///
    /// Unlike the view itself, the returned map does not change when more regions complete.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, TimingNode> {
        self.state.borrow().current_children()
    }

    /// Prints the regions at this level as an indented tree to stdout.
    ///
    /// Prints nothing if no regions have been entered.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }

        print!("{self}");
    }
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.to_map().values() {
            write!(f, "{node}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.to_map()).finish()
    }
}

/// Live view of the names of the currently open regions of a recorder, outermost first.
///
/// Obtain via [`stack()`](crate::stack) or [`Recorder::stack()`](crate::Recorder::stack).
///
/// # Examples
///
/// ```
/// use time_tree::Recorder;
///
/// let recorder = Recorder::new();
/// let stack = recorder.stack();
///
/// let _a = recorder.region("a");
/// let _b = recorder.region("b");
///
/// assert_eq!(stack.to_vec(), ["a", "b"]);
/// assert_eq!(stack.top().as_deref(), Some("b"));
/// ```
pub struct Stack {
    state: Rc<RefCell<TreeState>>,
}

impl Stack {
    pub(crate) fn new(state: Rc<RefCell<TreeState>>) -> Self {
        Self { state }
    }

    /// Copies the names of the open regions, outermost first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.state.borrow().stack_names()
    }

    /// Name of the innermost open region.
    #[must_use]
    pub fn top(&self) -> Option<String> {
        self.state.borrow().innermost_name()
    }

    /// Number of open regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().depth()
    }

    /// Whether no regions are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}
