//! Wait-For Graph
//!
//! This module implements the directed graph of wait-for relations between
//! processes, and the execution-order resolver that runs over it.
//!
//! # Overview
//!
//! - Nodes are processes, named by caller-supplied strings and addressed
//!   internally by dense [`NodeId`] handles
//! - An edge `A -> B` means process A is waiting for process B
//!
//! The graph may be cyclic; that is exactly what deadlock detection
//! inspects. Order resolution only succeeds on an acyclic graph.
//!
//! # Design Decisions
//!
//! 1. Nodes live in an arena indexed by handle rather than as linked node
//!    objects. Adjacency is a vector of successor lists, so iteration and
//!    probe keys (triples of handles) stay cheap.
//!
//! 2. Successor lists keep edge insertion order. Probe traces are
//!    reproducible only if neighbor iteration is.
//!
//! 3. There is no single-node or single-edge removal. The graph only grows
//!    until it is cleared.

mod error;
mod node;
mod order;
mod wait_for;

pub use error::{GraphError, GraphResult};
pub use node::NodeId;
pub use order::OrderResolver;
pub use wait_for::{EdgeInsertion, EdgeView, GraphSnapshot, WaitForGraph};
