//! The timing tree of one recorder and the stack discipline that maintains it.

use std::borrow::Cow;
use std::collections::BTreeMap;

use foldhash::{HashMap, HashMapExt};

use crate::{Error, Result, TimingNode};

/// Index of a node in the arena of a [`TreeState`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Debug)]
struct NodeData {
    name: Cow<'static, str>,
    total_elapsed: f64,
    count: u64,
    average_elapsed: f64,
    children: HashMap<Cow<'static, str>, NodeId>,
}

impl NodeData {
    fn new(name: Cow<'static, str>) -> Self {
        Self {
            name,
            total_elapsed: 0.0,
            count: 0,
            average_elapsed: 0.0,
            children: HashMap::new(),
        }
    }

    fn add_run(&mut self, elapsed: f64) {
        self.total_elapsed += elapsed;
        self.count = self
            .count
            .checked_add(1)
            .expect("region completion count overflows u64 - this indicates an unrealistic scenario");

        #[expect(
            clippy::cast_precision_loss,
            reason = "counts beyond 2^52 completions are not a realistic scenario"
        )]
        let count = self.count as f64;
        self.average_elapsed = self.total_elapsed / count;
    }
}

/// One open region: the node being measured and the node that was current before it.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    parent: NodeId,
}

/// Identifies an entered region so that its exit can be validated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Ticket {
    name: Cow<'static, str>,
    generation: u64,

    // Number of open regions right after this one was entered.
    depth: usize,

    node: NodeId,
}

impl Ticket {
    pub(crate) fn name(&self) -> &Cow<'static, str> {
        &self.name
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

/// Per-recorder timing tree with the stack of currently open regions.
///
/// Nodes live in an arena and refer to each other by index. Index 0 is the root, which is
/// never itself measured.
#[derive(Debug)]
pub(crate) struct TreeState {
    nodes: Vec<NodeData>,
    current: NodeId,
    stack: Vec<Frame>,

    // Incremented on every reset, tickets from earlier generations are stale.
    generation: u64,
}

impl TreeState {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(Cow::Borrowed(""))],
            current: ROOT,
            stack: Vec::new(),
            generation: 0,
        }
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "node IDs are only created by this arena and stale tickets are rejected before use"
    )]
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "node IDs are only created by this arena and stale tickets are rejected before use"
    )]
    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Opens a region as a child of the current node, creating the child on first entry.
    pub(crate) fn enter(&mut self, name: Cow<'static, str>) -> Ticket {
        let parent = self.current;

        let node = if let Some(&existing) = self.node(parent).children.get(&name) {
            existing
        } else {
            let id = NodeId(self.nodes.len());
            self.nodes.push(NodeData::new(name.clone()));
            self.node_mut(parent).children.insert(name.clone(), id);
            id
        };

        self.stack.push(Frame { node, parent });
        self.current = node;

        Ticket {
            name,
            generation: self.generation,
            depth: self.stack.len(),
            node,
        }
    }

    /// Closes the innermost open region, adding `elapsed` to its statistics.
    ///
    /// The ticket must belong to the innermost open region, otherwise nothing is modified
    /// and an error is returned.
    pub(crate) fn exit(&mut self, ticket: &Ticket, elapsed: f64) -> Result<NodeId> {
        if ticket.generation != self.generation {
            return Err(Error::StaleRegion {
                name: ticket.name.clone(),
            });
        }

        let is_innermost = self.stack.len() == ticket.depth
            && self.stack.last().is_some_and(|frame| frame.node == ticket.node);

        if !is_innermost {
            return Err(Error::UnbalancedExit {
                name: ticket.name.clone(),
                expected_depth: ticket.depth,
                actual_depth: self.stack.len(),
            });
        }

        self.node_mut(ticket.node).add_run(elapsed);

        let frame = self
            .stack
            .pop()
            .expect("guarded by innermost check above");
        self.current = frame.parent;

        Ok(frame.node)
    }

    /// Discards all nodes and open regions. Regions that are still open become stale.
    pub(crate) fn reset(&mut self) {
        let generation = self
            .generation
            .checked_add(1)
            .expect("reset count overflows u64 - this indicates an unrealistic scenario");

        *self = Self::new();
        self.generation = generation;
    }

    /// Number of currently open regions.
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Names of the open regions, outermost first.
    pub(crate) fn stack_names(&self) -> Vec<String> {
        self.stack
            .iter()
            .map(|frame| self.node(frame.node).name.to_string())
            .collect()
    }

    /// Name of the innermost open region, if any.
    pub(crate) fn innermost_name(&self) -> Option<String> {
        self.stack
            .last()
            .map(|frame| self.node(frame.node).name.to_string())
    }

    /// Names of the children of the current node, in ascending order.
    pub(crate) fn current_child_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .node(self.current)
            .children
            .keys()
            .map(ToString::to_string)
            .collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn current_child_count(&self) -> usize {
        self.node(self.current).children.len()
    }

    /// Whether the current node has a child with the given name.
    pub(crate) fn has_current_child(&self, name: &str) -> bool {
        self.node(self.current).children.contains_key(name)
    }

    /// Copies the child of the current node with the given name, including its subtree.
    pub(crate) fn current_child(&self, name: &str) -> Option<TimingNode> {
        self.node(self.current)
            .children
            .get(name)
            .map(|&id| self.snapshot(id))
    }

    /// Copies all children of the current node, including their subtrees.
    pub(crate) fn current_children(&self) -> BTreeMap<String, TimingNode> {
        self.children_of(self.current)
    }

    /// Copies the whole tree.
    pub(crate) fn root(&self) -> TimingNode {
        self.snapshot(ROOT)
    }

    /// Copies a node and its subtree.
    pub(crate) fn snapshot(&self, id: NodeId) -> TimingNode {
        let node = self.node(id);

        TimingNode::new(
            node.name.to_string(),
            node.total_elapsed,
            node.count,
            node.average_elapsed,
            self.children_of(id),
        )
    }

    fn children_of(&self, id: NodeId) -> BTreeMap<String, TimingNode> {
        self.node(id)
            .children
            .iter()
            .map(|(name, &child)| (name.to_string(), self.snapshot(child)))
            .collect()
    }
}
