//! Probe Engine
//!
//! Runs Chandy-Misra-Haas probe propagation over a wait-for graph snapshot.
//!
//! # Algorithm
//!
//! 1. For every node P (insertion order) and every successor Q of P (edge
//!    order), send the seed probe (P, P, Q)
//! 2. Evaluating a probe (i, s, r):
//!    a. Report it to the step callback
//!    b. If r == i, the probe traced a cycle back to its initiator: stop the
//!       whole run and report a deadlock
//!    c. Otherwise forward (i, r, x) for every successor x of r, in edge
//!       order, evaluating each one fully before the next
//! 3. If every seed is exhausted, there is no deadlock
//!
//! Every probe is marked in a per-run seen set before it is evaluated and is
//! never evaluated twice, so a run evaluates at most |V|·|E| probes and
//! always terminates.
//!
//! # Work List
//!
//! The forwarding recursion is unrolled onto an explicit stack. Each frame
//! holds an evaluated probe and a cursor into its receiver's successor list.
//! A forwarded probe is built, checked against the seen set and evaluated
//! only when the cursor reaches it, which is the same moment the recursive
//! formulation would. The trace is therefore identical to depth-first
//! recursion, without its depth limit.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::Probe;
use crate::graph::WaitForGraph;

/// Summary of one detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// A probe returned to its initiator.
    pub deadlock: bool,
    /// Every evaluated probe, in evaluation order. No probe appears twice.
    pub trace: Vec<Probe>,
}

impl Detection {
    /// Number of probes evaluated.
    pub fn probes(&self) -> usize {
        self.trace.len()
    }

    /// The probe that closed the cycle, if a deadlock was found.
    ///
    /// Its initiator is a deadlocked process.
    pub fn closing(&self) -> Option<&Probe> {
        if self.deadlock {
            self.trace.last()
        } else {
            None
        }
    }
}

/// A pending evaluation: the probe and how far through its receiver's
/// successors forwarding has progressed.
struct Frame {
    probe: Probe,
    cursor: usize,
}

/// Deadlock detector over a read-only graph snapshot.
pub struct ProbeEngine<'g> {
    graph: &'g WaitForGraph,
}

impl<'g> ProbeEngine<'g> {
    /// Create an engine over the given graph.
    pub fn new(graph: &'g WaitForGraph) -> Self {
        Self { graph }
    }

    /// Check whether the graph is deadlocked.
    pub fn detect(&self) -> bool {
        self.run(|_| {}).deadlock
    }

    /// Run detection, calling `on_step` once per evaluated probe in
    /// evaluation order.
    pub fn run<F>(&self, mut on_step: F) -> Detection
    where
        F: FnMut(&Probe),
    {
        let mut seen = IndexSet::new();
        let mut deadlock = false;

        'seeds: for node in self.graph.nodes() {
            for &successor in self.graph.neighbors(node) {
                let seed = Probe::seed(node, successor);
                if seen.insert(seed) && self.propagate(seed, &mut seen, &mut on_step) {
                    deadlock = true;
                    break 'seeds;
                }
            }
        }

        tracing::trace!(
            deadlock = deadlock,
            probes = seen.len(),
            event = "probe_run_finished",
            "Probe run finished"
        );

        Detection {
            deadlock,
            trace: seen.into_iter().collect(),
        }
    }

    /// Evaluate `seed` and everything it forwards. Returns true as soon as a
    /// probe closes a cycle.
    fn propagate<F>(&self, seed: Probe, seen: &mut IndexSet<Probe>, on_step: &mut F) -> bool
    where
        F: FnMut(&Probe),
    {
        if Self::evaluate(&seed, on_step) {
            return true;
        }

        let mut stack = vec![Frame { probe: seed, cursor: 0 }];

        while let Some(frame) = stack.last_mut() {
            let successors = self.graph.neighbors(frame.probe.receiver);
            let Some(&next) = successors.get(frame.cursor) else {
                stack.pop();
                continue;
            };
            frame.cursor += 1;

            let forwarded = frame.probe.forward(next);
            if !seen.insert(forwarded) {
                continue;
            }
            if Self::evaluate(&forwarded, on_step) {
                return true;
            }
            stack.push(Frame {
                probe: forwarded,
                cursor: 0,
            });
        }

        false
    }

    fn evaluate<F>(probe: &Probe, on_step: &mut F) -> bool
    where
        F: FnMut(&Probe),
    {
        on_step(probe);
        probe.closes_cycle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn build(names: &[&str], edges: &[(&str, &str)]) -> WaitForGraph {
        let mut graph = WaitForGraph::new();
        for name in names {
            graph.add_node(*name);
        }
        for (source, target) in edges {
            graph.connect(source, target).unwrap();
        }
        graph
    }

    fn names(graph: &WaitForGraph, trace: &[Probe]) -> Vec<(String, String, String)> {
        let name = |n: NodeId| graph.name(n).unwrap().to_string();
        trace
            .iter()
            .map(|p| (name(p.initiator), name(p.sender), name(p.receiver)))
            .collect()
    }

    fn triple(i: &str, s: &str, r: &str) -> (String, String, String) {
        (i.to_string(), s.to_string(), r.to_string())
    }

    #[test]
    fn empty_graph_has_no_deadlock() {
        let graph = WaitForGraph::new();
        let detection = ProbeEngine::new(&graph).run(|_| {});
        assert!(!detection.deadlock);
        assert_eq!(detection.probes(), 0);
        assert!(detection.closing().is_none());
    }

    #[test]
    fn nodes_without_edges_have_no_deadlock() {
        let graph = build(&["A", "B", "C"], &[]);
        assert!(!ProbeEngine::new(&graph).detect());
    }

    #[test]
    fn mutual_wait_is_deadlock() {
        let graph = build(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let detection = ProbeEngine::new(&graph).run(|_| {});

        assert!(detection.deadlock);
        assert_eq!(
            names(&graph, &detection.trace),
            vec![triple("A", "A", "B"), triple("A", "B", "A")]
        );
        assert_eq!(detection.closing().map(|p| p.initiator), graph.id_of("A"));
    }

    #[test]
    fn three_cycle_trace() {
        let graph = build(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let detection = ProbeEngine::new(&graph).run(|_| {});

        assert!(detection.deadlock);
        assert!(detection.probes() <= 9);
        assert_eq!(
            names(&graph, &detection.trace),
            vec![
                triple("A", "A", "B"),
                triple("A", "B", "C"),
                triple("A", "C", "A"),
            ]
        );
    }

    #[test]
    fn chain_trace_exhausts_every_seed() {
        let graph = build(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let detection = ProbeEngine::new(&graph).run(|_| {});

        assert!(!detection.deadlock);
        assert_eq!(
            names(&graph, &detection.trace),
            vec![
                triple("A", "A", "B"),
                triple("A", "B", "C"),
                triple("B", "B", "C"),
            ]
        );
    }

    #[test]
    fn traversal_is_depth_first_in_edge_order() {
        // A waits on B then C; B waits on D. The whole B subtree is
        // evaluated before the probe to C is sent.
        let graph = build(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D")],
        );
        let detection = ProbeEngine::new(&graph).run(|_| {});

        assert_eq!(
            names(&graph, &detection.trace),
            vec![
                triple("A", "A", "B"),
                triple("A", "B", "D"),
                triple("A", "A", "C"),
                triple("B", "B", "D"),
            ]
        );
    }

    #[test]
    fn cycle_not_through_initiator_is_found_from_its_own_seed() {
        // S feeds a cycle it is not part of. Probes from S never return to
        // S, so the verdict comes from a seed inside the cycle.
        let graph = build(
            &["S", "A", "B"],
            &[("S", "A"), ("A", "B"), ("B", "A")],
        );
        let detection = ProbeEngine::new(&graph).run(|_| {});

        assert!(detection.deadlock);
        assert_eq!(
            names(&graph, &detection.trace),
            vec![
                triple("S", "S", "A"),
                triple("S", "A", "B"),
                triple("S", "B", "A"),
                triple("A", "A", "B"),
                triple("A", "B", "A"),
            ]
        );
        assert_eq!(detection.closing().map(|p| p.initiator), graph.id_of("A"));
    }

    #[test]
    fn callback_sees_trace_in_order() {
        let graph = build(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let mut steps = Vec::new();
        let detection = ProbeEngine::new(&graph).run(|p| steps.push(*p));
        assert_eq!(steps, detection.trace);
    }

    #[test]
    fn run_is_reproducible() {
        let graph = build(
            &["A", "B", "C", "D"],
            &[("A", "C"), ("C", "B"), ("B", "D"), ("D", "C"), ("A", "D")],
        );
        let engine = ProbeEngine::new(&graph);
        assert_eq!(engine.run(|_| {}), engine.run(|_| {}));
    }

    #[test]
    fn complete_graph_terminates_within_bound() {
        let names: Vec<String> = (0..6).map(|i| format!("P{i}")).collect();
        let mut graph = WaitForGraph::new();
        for name in &names {
            graph.add_node(name.as_str());
        }
        // Acyclic tournament: every process waits on every later one.
        for (i, source) in names.iter().enumerate() {
            for target in &names[i + 1..] {
                graph.connect(source, target).unwrap();
            }
        }

        let detection = ProbeEngine::new(&graph).run(|_| {});
        assert!(!detection.deadlock);
        assert!(detection.probes() <= graph.node_count() * graph.edge_count());
    }
}
