use std::collections::BTreeMap;
use std::fmt::{self, Display, Write};

/// Accumulated statistics of one region at one position in the timing tree.
///
/// This is an owned copy of the recorded data, taken at the moment it was requested. It is
/// independent of the recorder it came from and can be sent to other threads.
///
/// A node may carry its own statistics and child nodes at the same time. If the same region
/// is entered both as a leaf and as the parent of other regions at the same tree position,
/// all of it is merged into the same node.
///
/// For human-readable output, use the `Display` trait implementation, which renders the node
/// and all of its descendants as an indented tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingNode {
    name: String,
    total_elapsed: f64,
    count: u64,
    average_elapsed: f64,
    children: BTreeMap<String, Self>,
}

impl TimingNode {
    #[must_use]
    pub(crate) fn new(
        name: String,
        total_elapsed: f64,
        count: u64,
        average_elapsed: f64,
        children: BTreeMap<String, Self>,
    ) -> Self {
        Self {
            name,
            total_elapsed,
            count,
            average_elapsed,
            children,
        }
    }

    /// The name of the region. The root of a tree has an empty name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum of the elapsed time of every completed run of the region, in clock units.
    #[must_use]
    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    /// Number of times the region has completed.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean elapsed time per completed run, in clock units.
    ///
    /// Zero if the region has never completed.
    #[must_use]
    pub fn average_elapsed(&self) -> f64 {
        self.average_elapsed
    }

    /// Child regions keyed by name.
    #[must_use]
    pub fn children(&self) -> &BTreeMap<String, Self> {
        &self.children
    }

    /// Gets the child region with the given name, if it has been entered.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.get(name)
    }

    /// Follows a path of child names down the tree.
    ///
    /// An empty path returns the node itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use time_tree::Recorder;
    ///
    /// let recorder = Recorder::new();
    /// {
    ///     let _a = recorder.region("a");
    ///     let _b = recorder.region("b");
    /// }
    ///
    /// let root = recorder.root();
    /// assert_eq!(root.descendant(&["a", "b"]).unwrap().count(), 1);
    /// assert!(root.descendant(&["b"]).is_none());
    /// ```
    #[must_use]
    pub fn descendant(&self, path: &[&str]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, name| node.children.get(*name))
    }

    /// Whether the region has never completed and has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.children.is_empty()
    }

    fn write_indented(&self, depth: usize, out: &mut String) -> fmt::Result {
        for _ in 0..depth {
            out.push_str("  ");
        }

        writeln!(
            out,
            "{}: total {:.6}, count {}, average {:.6}",
            self.name, self.total_elapsed, self.count, self.average_elapsed
        )?;

        let child_depth = depth.saturating_add(1);
        for child in self.children.values() {
            child.write_indented(child_depth, out)?;
        }

        Ok(())
    }
}

impl Display for TimingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        if self.name.is_empty() {
            // The root is not a region of its own, only its children are shown.
            for child in self.children.values() {
                child.write_indented(0, &mut out)?;
            }
        } else {
            self.write_indented(0, &mut out)?;
        }

        f.write_str(&out)
    }
}
