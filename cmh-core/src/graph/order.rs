//! Execution Order
//!
//! Computes a linear order of processes consistent with every edge: for
//! every edge `u -> v`, `u` is placed before `v`. Such an order exists only
//! when the graph is acyclic.
//!
//! # Algorithm
//!
//! Kahn's algorithm:
//!
//! 1. Compute the in-degree of every node
//! 2. Every node with in-degree 0 is ready
//! 3. Repeatedly emit the ready node with the lowest insertion index and
//!    decrement the in-degree of its successors, marking new zeros ready
//! 4. If some node is never emitted, the graph has a cycle
//!
//! Picking the lowest insertion index among ready nodes makes the result
//! deterministic for a given graph.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::error::{GraphError, GraphResult};
use super::{NodeId, WaitForGraph};

/// Resolves a topological execution order over a [`WaitForGraph`].
pub struct OrderResolver<'g> {
    graph: &'g WaitForGraph,
}

impl<'g> OrderResolver<'g> {
    /// Create a resolver over the given graph.
    pub fn new(graph: &'g WaitForGraph) -> Self {
        Self { graph }
    }

    /// Compute the order as node handles.
    ///
    /// Fails with [`GraphError::CycleDetected`] if the graph is cyclic; no
    /// partial order is returned in that case.
    pub fn resolve(&self) -> GraphResult<Vec<NodeId>> {
        let count = self.graph.node_count();
        let mut in_degree = vec![0usize; count];
        for (_, target) in self.graph.edges() {
            in_degree[target.index()] += 1;
        }

        let mut ready: BinaryHeap<Reverse<NodeId>> = self
            .graph
            .nodes()
            .filter(|n| in_degree[n.index()] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(count);

        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);

            for &successor in self.graph.neighbors(node) {
                let degree = &mut in_degree[successor.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(successor));
                }
            }
        }

        if order.len() != count {
            let remaining = self
                .graph
                .nodes()
                .filter(|n| in_degree[n.index()] > 0)
                .map(|n| self.graph.label(n).to_string())
                .collect();
            return Err(GraphError::cycle(remaining));
        }

        Ok(order)
    }

    /// Compute the order as process names.
    pub fn resolve_names(&self) -> GraphResult<Vec<String>> {
        Ok(self
            .resolve()?
            .into_iter()
            .map(|n| self.graph.label(n).to_string())
            .collect())
    }
}
