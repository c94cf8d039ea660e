//! Error types for simulation commands

use thiserror::Error;

use crate::graph::GraphError;

/// Result type for simulation commands
pub type SimResult<T> = Result<T, SimError>;

/// Errors returned by [`Simulation`](super::Simulation) commands
///
/// None of these leave the graph in an inconsistent state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SimError {
    /// A command arrived while a detection or ordering run was in progress
    #[error("Simulation is busy: a run is in progress")]
    Busy,

    /// The graph rejected the command
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Reason for rejection
        reason: String,
    },
}

impl SimError {
    /// Creates a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if the command can simply be retried once the current
    /// run has finished
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Returns true if this error reports a cyclic graph
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Graph(e) if e.is_cycle())
    }
}
