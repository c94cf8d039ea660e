//! Error types for graph operations

use thiserror::Error;

use super::NodeId;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during graph operations
///
/// Self-edges and duplicate edges are not errors; see
/// [`EdgeInsertion`](super::EdgeInsertion).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// An edge endpoint names a process that is not in the graph
    #[error("Unknown process: {id}")]
    UnknownNode {
        /// The process name that was not found
        id: String,
    },

    /// A handle that this graph never issued (or issued before a clear)
    #[error("Invalid node handle: {handle}")]
    InvalidHandle {
        /// The stale or foreign handle
        handle: NodeId,
    },

    /// The graph has a cycle, so no execution order exists
    #[error("Cycle detected: {} process(es) cannot be ordered: {}", .remaining.len(), .remaining.join(", "))]
    CycleDetected {
        /// Processes left unordered, in insertion order
        remaining: Vec<String>,
    },
}

impl GraphError {
    /// Creates an unknown node error
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Creates an invalid handle error
    pub fn invalid_handle(handle: NodeId) -> Self {
        Self::InvalidHandle { handle }
    }

    /// Creates a cycle detected error
    pub fn cycle(remaining: Vec<String>) -> Self {
        Self::CycleDetected { remaining }
    }

    /// Returns true if this error reports a cycle
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }
}
