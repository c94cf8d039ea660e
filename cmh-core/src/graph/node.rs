//! Graph Nodes
//!
//! Processes in the wait-for graph are addressed by dense integer handles.
//! A handle is the position of the process in insertion order, so it doubles
//! as an index into the per-node adjacency arrays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle of a process in a [`WaitForGraph`](super::WaitForGraph).
///
/// Handles are assigned sequentially from zero as processes are added and
/// are only meaningful for the graph that issued them. Clearing the graph
/// invalidates every handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw index.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
