//! Wait-For Graph
//!
//! The graph stores processes in an arena: a process's [`NodeId`] is its
//! position in insertion order, and adjacency is an array of successor lists
//! indexed by that handle. An edge `u -> v` means "u is waiting for v".
//!
//! # Invariants
//!
//! - No self-edges. `add_edge(u, u)` is rejected as a no-op.
//! - No duplicate ordered edges. Re-inserting `u -> v` is a no-op.
//! - Every edge endpoint is a known node.
//! - Successor lists keep edge insertion order. Probe traversal depends on
//!   this order, so it must never be sorted or deduplicated in place.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::{GraphError, GraphResult};
use super::NodeId;

/// Successor list of a single node. Most processes wait on only a few others.
type Successors = SmallVec<[NodeId; 4]>;

/// Outcome of an edge insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsertion {
    /// The edge was added.
    Inserted {
        /// The reverse edge already existed when this one was added.
        mutual: bool,
    },

    /// Rejected: a process cannot wait on itself.
    SelfLoop,

    /// Rejected: the edge already exists.
    Duplicate,
}

impl EdgeInsertion {
    /// Returns true if the graph changed.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// A directed graph of "process A is waiting for process B" relations.
#[derive(Debug, Clone, Default)]
pub struct WaitForGraph {
    /// Process names; the position of a name is its handle.
    names: IndexSet<String>,
    /// Direct successors per node, in edge insertion order.
    successors: Vec<Successors>,
    /// All edges, in insertion order.
    edges: IndexSet<(NodeId, NodeId)>,
}

impl WaitForGraph {
    /// Create a new, empty wait-for graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a process.
    ///
    /// Returns the process handle and whether it was newly inserted. Adding
    /// a name that is already present returns the existing handle.
    pub fn add_node(&mut self, name: impl Into<String>) -> (NodeId, bool) {
        let (index, inserted) = self.names.insert_full(name.into());
        if inserted {
            self.successors.push(Successors::new());
        }
        (NodeId::from_index(index), inserted)
    }

    /// Record that `source` is waiting for `target`.
    ///
    /// Self-edges and duplicates leave the graph unchanged and are reported
    /// through the returned [`EdgeInsertion`].
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> GraphResult<EdgeInsertion> {
        self.check(source)?;
        self.check(target)?;

        if source == target {
            return Ok(EdgeInsertion::SelfLoop);
        }
        if !self.edges.insert((source, target)) {
            return Ok(EdgeInsertion::Duplicate);
        }

        self.successors[source.index()].push(target);
        Ok(EdgeInsertion::Inserted {
            mutual: self.edges.contains(&(target, source)),
        })
    }

    /// Name-based form of [`add_edge`](Self::add_edge).
    pub fn connect(&mut self, source: &str, target: &str) -> GraphResult<EdgeInsertion> {
        let source = self.require(source)?;
        let target = self.require(target)?;
        self.add_edge(source, target)
    }

    /// Direct successors of `node`, in edge insertion order.
    ///
    /// Unknown handles have no successors.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.successors
            .get(node.index())
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// Check whether `source` is waiting for `target`.
    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.edges.contains(&(source, target))
    }

    /// Look up the handle of a process by name.
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.names.get_index_of(name).map(NodeId::from_index)
    }

    /// Look up the name of a process by handle.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.names.get_index(node.index()).map(String::as_str)
    }

    /// Name of a handle that is known to belong to this graph.
    pub(crate) fn label(&self, node: NodeId) -> &str {
        self.name(node).unwrap_or_default()
    }

    /// Check whether a process with this name exists.
    pub fn contains_node(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// All handles, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.names.len()).map(NodeId::from_index)
    }

    /// All process names, in insertion order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    /// Get the number of processes.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the graph has no processes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Remove every process and edge.
    pub fn clear(&mut self) {
        self.names.clear();
        self.successors.clear();
        self.edges.clear();
    }

    /// Owned, serializable copy of the graph for redrawing.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.names.iter().cloned().collect(),
            edges: self
                .edges
                .iter()
                .map(|&(source, target)| EdgeView {
                    source: self.label(source).to_string(),
                    target: self.label(target).to_string(),
                    mutual: self.has_edge(target, source),
                })
                .collect(),
        }
    }

    fn check(&self, node: NodeId) -> GraphResult<()> {
        if node.index() < self.names.len() {
            Ok(())
        } else {
            Err(GraphError::invalid_handle(node))
        }
    }

    fn require(&self, name: &str) -> GraphResult<NodeId> {
        self.id_of(name).ok_or_else(|| GraphError::unknown_node(name))
    }
}

/// Serializable view of a [`WaitForGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Process names in insertion order.
    pub nodes: Vec<String>,
    /// Edges in insertion order.
    pub edges: Vec<EdgeView>,
}

/// A single edge in a [`GraphSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    /// The reverse edge is also present.
    pub mutual: bool,
}
