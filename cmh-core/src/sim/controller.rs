//! Simulation Controller
//!
//! The controller owns one wait-for graph and is the only thing that mutates
//! it. The front end drives it through five commands (add node, add edge,
//! detect deadlock, compute order, reset) and listens through registered
//! observers.
//!
//! # How It Works
//!
//! 1. Mutation commands take the graph's write lock, apply the change,
//!    release the lock, then notify observers.
//!
//! 2. Analysis commands claim the run flag, read the graph, and stream
//!    per-probe events to observers while the run is in progress.
//!
//! 3. The run flag is released before the final result is delivered, so an
//!    observer can react to a result with a new command.
//!
//! # Re-entrancy
//!
//! Observers are called synchronously and may hold a handle to the
//! simulation. Commands issued from an observer while a run is in progress
//! fail with [`SimError::Busy`] instead of blocking; queries always succeed.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::RwLock;

use super::config::SimulationConfig;
use super::error::{SimError, SimResult};
use super::event::{OrderOutcome, SimEvent};
use super::guard::RunGuard;
use super::observer::{EventLog, ObserverId, SimulationObserver};
use crate::graph::{EdgeInsertion, GraphError, GraphSnapshot, NodeId, OrderResolver, WaitForGraph};
use crate::probe::{Detection, ProbeEngine};

/// Graph plus the counter for auto-assigned process names.
#[derive(Default)]
struct State {
    graph: WaitForGraph,
    next_process: usize,
}

/// Owner of a wait-for graph and its analysis runs.
///
/// # Example
///
/// ```
/// use cmh_core::sim::Simulation;
///
/// let sim = Simulation::new();
/// sim.add_node("A").unwrap();
/// sim.add_node("B").unwrap();
/// sim.add_edge("A", "B").unwrap();
/// sim.add_edge("B", "A").unwrap();
///
/// assert!(sim.detect_deadlock().unwrap());
/// assert!(sim.compute_order().unwrap_err().is_cycle());
/// ```
pub struct Simulation {
    config: SimulationConfig,
    state: RwLock<State>,
    /// Set while a detection or ordering run is in progress.
    running: AtomicBool,
    observers: RwLock<Vec<(ObserverId, Arc<dyn SimulationObserver>)>>,
    log: Option<Arc<EventLog>>,
}

impl Simulation {
    /// Create a simulation with the default configuration.
    pub fn new() -> Self {
        Self::build(SimulationConfig::default())
    }

    /// Create a simulation with a validated configuration.
    pub fn with_config(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        let log = config.record_events.then(|| Arc::new(EventLog::new()));
        let mut observers: Vec<(ObserverId, Arc<dyn SimulationObserver>)> = Vec::new();
        if let Some(log) = &log {
            let recorder: Arc<dyn SimulationObserver> = log.clone();
            observers.push((ObserverId::new(), recorder));
        }

        Self {
            config,
            state: RwLock::new(State::default()),
            running: AtomicBool::new(false),
            observers: RwLock::new(observers),
            log,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    /// Register an observer. Observers are notified in registration order.
    pub fn subscribe(&self, observer: Arc<dyn SimulationObserver>) -> ObserverId {
        let id = ObserverId::new();
        self.observers.write().push((id, observer));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Events recorded so far, if `record_events` is enabled.
    pub fn recorded_events(&self) -> Vec<SimEvent> {
        self.log.as_ref().map(|log| log.events()).unwrap_or_default()
    }

    /// Remove and return the recorded events.
    pub fn take_recorded_events(&self) -> Vec<SimEvent> {
        self.log.as_ref().map(|log| log.drain()).unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Mutation commands
    // ------------------------------------------------------------------------

    /// Add a process. Returns false if it already existed.
    pub fn add_node(&self, id: &str) -> SimResult<bool> {
        self.ensure_idle("add_node")?;

        let (_, inserted) = self.state.write().graph.add_node(id);
        if inserted {
            tracing::info!(process = id, event = "node_added", "Added process");
            self.emit(SimEvent::NodeAdded { id: id.to_string() });
        }
        Ok(inserted)
    }

    /// Add a process with the next free auto-assigned name.
    pub fn add_process(&self) -> SimResult<String> {
        self.ensure_idle("add_process")?;

        let id = {
            let mut state = self.state.write();
            let id = loop {
                let candidate = format!("{}{}", self.config.node_prefix, state.next_process);
                state.next_process += 1;
                if !state.graph.contains_node(&candidate) {
                    break candidate;
                }
            };
            state.graph.add_node(id.as_str());
            id
        };

        tracing::info!(process = %id, event = "node_added", "Added process");
        self.emit(SimEvent::NodeAdded { id: id.clone() });
        Ok(id)
    }

    /// Record that `source` is waiting for `target`.
    ///
    /// Self-edges and duplicate edges are accepted as no-ops and reported in
    /// the returned [`EdgeInsertion`]. Unknown endpoints are an error.
    pub fn add_edge(&self, source: &str, target: &str) -> SimResult<EdgeInsertion> {
        self.ensure_idle("add_edge")?;

        let insertion = self.state.write().graph.connect(source, target)?;
        match insertion {
            EdgeInsertion::Inserted { mutual } => {
                tracing::info!(
                    source = source,
                    target = target,
                    mutual = mutual,
                    event = "edge_added",
                    "Connected {} → {}",
                    source,
                    target
                );
                self.emit(SimEvent::EdgeAdded {
                    source: source.to_string(),
                    target: target.to_string(),
                    mutual,
                });
            }
            EdgeInsertion::SelfLoop => {
                tracing::debug!(process = source, event = "edge_rejected", "Ignored self-wait");
            }
            EdgeInsertion::Duplicate => {
                tracing::debug!(
                    source = source,
                    target = target,
                    event = "edge_rejected",
                    "Ignored duplicate edge"
                );
            }
        }
        Ok(insertion)
    }

    /// Clear the graph and restart auto-assigned names from zero.
    pub fn reset(&self) -> SimResult<()> {
        self.ensure_idle("reset")?;

        {
            let mut state = self.state.write();
            state.graph.clear();
            state.next_process = 0;
        }

        tracing::info!(event = "reset", "Simulation reset");
        self.emit(SimEvent::Reset);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Analysis commands
    // ------------------------------------------------------------------------

    /// Run probe-based deadlock detection.
    pub fn detect_deadlock(&self) -> SimResult<bool> {
        Ok(self.detect_deadlock_detailed()?.deadlock)
    }

    /// Run probe-based deadlock detection and return the full trace.
    ///
    /// Probe handles in the trace can be turned into names with
    /// [`name_of`](Self::name_of) until the next reset.
    pub fn detect_deadlock_detailed(&self) -> SimResult<Detection> {
        let guard = self.begin_run("detect_deadlock")?;

        let observers = if self.config.emit_probe_steps {
            self.observer_list()
        } else {
            Vec::new()
        };

        let detection = {
            let state = self.state.read();
            let graph = &state.graph;
            ProbeEngine::new(graph).run(|probe| {
                let initiator = graph.label(probe.initiator);
                let sender = graph.label(probe.sender);
                let receiver = graph.label(probe.receiver);

                tracing::trace!(
                    initiator = initiator,
                    sender = sender,
                    receiver = receiver,
                    event = "probe_step",
                    "Probe ({},{},{})",
                    initiator,
                    sender,
                    receiver
                );
                for observer in &observers {
                    observer.on_probe_step(initiator, sender, receiver);
                }
            })
        };
        drop(guard);

        tracing::info!(
            deadlock = detection.deadlock,
            probes = detection.probes(),
            event = "deadlock_result",
            "{}",
            if detection.deadlock {
                "Deadlock detected"
            } else {
                "No deadlock detected"
            }
        );
        self.emit(SimEvent::DeadlockResult {
            found: detection.deadlock,
        });
        Ok(detection)
    }

    /// Compute an execution order, or fail with a cycle error.
    pub fn compute_order(&self) -> SimResult<Vec<String>> {
        let guard = self.begin_run("compute_order")?;
        let result = OrderResolver::new(&self.state.read().graph).resolve_names();
        drop(guard);

        match result {
            Ok(order) => {
                tracing::info!(
                    processes = order.len(),
                    event = "order_result",
                    "Execution order: {}",
                    order.join(" → ")
                );
                self.emit(SimEvent::OrderResult {
                    outcome: OrderOutcome::Sequence {
                        order: order.clone(),
                    },
                });
                Ok(order)
            }
            Err(err) => {
                if let GraphError::CycleDetected { remaining } = &err {
                    tracing::info!(
                        unordered = remaining.len(),
                        event = "order_result",
                        "Cycle detected, no execution order"
                    );
                    self.emit(SimEvent::OrderResult {
                        outcome: OrderOutcome::CycleDetected {
                            remaining: remaining.clone(),
                        },
                    });
                }
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.state.read_recursive().graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read_recursive().graph.edge_count()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.state.read_recursive().graph.contains_node(id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        let state = self.state.read_recursive();
        match (state.graph.id_of(source), state.graph.id_of(target)) {
            (Some(source), Some(target)) => state.graph.has_edge(source, target),
            _ => false,
        }
    }

    /// Processes `id` waits on, in edge insertion order.
    pub fn neighbors(&self, id: &str) -> Vec<String> {
        let state = self.state.read_recursive();
        let graph = &state.graph;
        graph
            .id_of(id)
            .map(|node| {
                graph
                    .neighbors(node)
                    .iter()
                    .map(|&n| graph.label(n).to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All processes, in insertion order.
    pub fn nodes(&self) -> Vec<String> {
        self.state
            .read_recursive()
            .graph
            .node_names()
            .map(str::to_string)
            .collect()
    }

    /// Name of a handle from a detection trace.
    pub fn name_of(&self, node: NodeId) -> Option<String> {
        self.state
            .read_recursive()
            .graph
            .name(node)
            .map(str::to_string)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.state.read_recursive().graph.snapshot()
    }

    /// Check whether a detection or ordering run is in progress.
    pub fn is_running(&self) -> bool {
        RunGuard::is_held(&self.running)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn ensure_idle(&self, command: &'static str) -> SimResult<()> {
        if self.is_running() {
            tracing::debug!(command = command, event = "busy", "Rejected command during run");
            return Err(SimError::Busy);
        }
        Ok(())
    }

    fn begin_run(&self, command: &'static str) -> SimResult<RunGuard<'_>> {
        RunGuard::acquire(&self.running).ok_or_else(|| {
            tracing::debug!(command = command, event = "busy", "Rejected command during run");
            SimError::Busy
        })
    }

    /// Snapshot of the observer list, so no lock is held while callbacks run.
    fn observer_list(&self) -> Vec<Arc<dyn SimulationObserver>> {
        self.observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }

    fn emit(&self, event: SimEvent) {
        for observer in self.observer_list() {
            event.dispatch(observer.as_ref());
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> Simulation {
        Simulation::with_config(SimulationConfig::default().with_recording(true)).unwrap()
    }

    #[test]
    fn empty_simulation_has_no_deadlock() {
        let sim = Simulation::new();
        assert_eq!(sim.detect_deadlock(), Ok(false));
        assert_eq!(sim.compute_order(), Ok(Vec::new()));
    }

    #[test]
    fn self_edge_leaves_edge_count_unchanged() {
        let sim = Simulation::new();
        sim.add_node("A").unwrap();
        assert_eq!(sim.add_edge("A", "A"), Ok(EdgeInsertion::SelfLoop));
        assert_eq!(sim.edge_count(), 0);
    }

    #[test]
    fn duplicate_edge_counts_once() {
        let sim = Simulation::new();
        sim.add_node("A").unwrap();
        sim.add_node("B").unwrap();
        sim.add_edge("A", "B").unwrap();
        assert_eq!(sim.add_edge("A", "B"), Ok(EdgeInsertion::Duplicate));
        assert_eq!(sim.edge_count(), 1);
    }

    #[test]
    fn unknown_endpoint_is_an_error() {
        let sim = Simulation::new();
        sim.add_node("A").unwrap();
        assert_eq!(
            sim.add_edge("A", "B"),
            Err(SimError::Graph(GraphError::unknown_node("B")))
        );
        assert_eq!(sim.edge_count(), 0);
    }

    #[test]
    fn add_process_assigns_sequential_names() {
        let sim = Simulation::new();
        assert_eq!(sim.add_process().unwrap(), "P0");
        assert_eq!(sim.add_process().unwrap(), "P1");

        // A caller-supplied name is skipped over.
        sim.add_node("P2").unwrap();
        assert_eq!(sim.add_process().unwrap(), "P3");

        sim.reset().unwrap();
        assert_eq!(sim.add_process().unwrap(), "P0");
    }

    #[test]
    fn add_process_uses_configured_prefix() {
        let sim =
            Simulation::with_config(SimulationConfig::default().with_node_prefix("T")).unwrap();
        assert_eq!(sim.add_process().unwrap(), "T0");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig::default().with_node_prefix("");
        assert!(matches!(
            Simulation::with_config(config),
            Err(SimError::Config { .. })
        ));
    }

    #[test]
    fn duplicate_node_emits_nothing() {
        let sim = recording();
        assert_eq!(sim.add_node("A"), Ok(true));
        assert_eq!(sim.add_node("A"), Ok(false));
        assert_eq!(
            sim.recorded_events(),
            vec![SimEvent::NodeAdded { id: "A".into() }]
        );
    }

    #[test]
    fn events_follow_command_order() {
        let sim = recording();
        sim.add_node("A").unwrap();
        sim.add_node("B").unwrap();
        sim.add_edge("A", "B").unwrap();
        sim.add_edge("A", "A").unwrap();
        sim.add_edge("B", "A").unwrap();
        sim.detect_deadlock().unwrap();

        assert_eq!(
            sim.take_recorded_events(),
            vec![
                SimEvent::NodeAdded { id: "A".into() },
                SimEvent::NodeAdded { id: "B".into() },
                SimEvent::EdgeAdded {
                    source: "A".into(),
                    target: "B".into(),
                    mutual: false,
                },
                SimEvent::EdgeAdded {
                    source: "B".into(),
                    target: "A".into(),
                    mutual: true,
                },
                SimEvent::ProbeStep {
                    initiator: "A".into(),
                    sender: "A".into(),
                    receiver: "B".into(),
                },
                SimEvent::ProbeStep {
                    initiator: "A".into(),
                    sender: "B".into(),
                    receiver: "A".into(),
                },
                SimEvent::DeadlockResult { found: true },
            ]
        );
        assert!(sim.recorded_events().is_empty());
    }

    #[test]
    fn probe_steps_can_be_suppressed() {
        let sim = Simulation::with_config(
            SimulationConfig::default()
                .with_recording(true)
                .with_probe_steps(false),
        )
        .unwrap();
        sim.add_node("A").unwrap();
        sim.add_node("B").unwrap();
        sim.add_edge("A", "B").unwrap();
        sim.add_edge("B", "A").unwrap();
        sim.take_recorded_events();

        let detection = sim.detect_deadlock_detailed().unwrap();
        assert!(detection.deadlock);
        assert_eq!(detection.probes(), 2);
        assert_eq!(
            sim.recorded_events(),
            vec![SimEvent::DeadlockResult { found: true }]
        );
    }

    #[test]
    fn closing_probe_names_a_deadlocked_process() {
        let sim = Simulation::new();
        for id in ["S", "A", "B"] {
            sim.add_node(id).unwrap();
        }
        sim.add_edge("S", "A").unwrap();
        sim.add_edge("A", "B").unwrap();
        sim.add_edge("B", "A").unwrap();

        let detection = sim.detect_deadlock_detailed().unwrap();
        let closing = detection.closing().unwrap();
        assert_eq!(sim.name_of(closing.initiator).as_deref(), Some("A"));
    }

    #[test]
    fn order_result_is_emitted() {
        let sim = recording();
        sim.add_node("A").unwrap();
        sim.add_node("B").unwrap();
        sim.add_edge("A", "B").unwrap();
        sim.take_recorded_events();

        assert_eq!(sim.compute_order().unwrap(), vec!["A", "B"]);
        sim.add_edge("B", "A").unwrap();
        assert!(sim.compute_order().unwrap_err().is_cycle());

        let events = sim.recorded_events();
        assert_eq!(
            events[0],
            SimEvent::OrderResult {
                outcome: OrderOutcome::Sequence {
                    order: vec!["A".into(), "B".into()],
                },
            }
        );
        assert_eq!(
            events[2],
            SimEvent::OrderResult {
                outcome: OrderOutcome::CycleDetected {
                    remaining: vec!["A".into(), "B".into()],
                },
            }
        );
    }

    #[test]
    fn reset_clears_graph() {
        let sim = recording();
        sim.add_node("A").unwrap();
        sim.add_node("B").unwrap();
        sim.add_edge("A", "B").unwrap();
        sim.add_edge("B", "A").unwrap();

        sim.reset().unwrap();
        assert_eq!(sim.node_count(), 0);
        assert_eq!(sim.edge_count(), 0);
        assert_eq!(sim.detect_deadlock(), Ok(false));
        assert!(sim.recorded_events().contains(&SimEvent::Reset));
    }

    #[test]
    fn queries_reflect_graph() {
        let sim = Simulation::new();
        for id in ["A", "B", "C"] {
            sim.add_node(id).unwrap();
        }
        sim.add_edge("A", "C").unwrap();
        sim.add_edge("A", "B").unwrap();

        assert!(sim.contains_node("B"));
        assert!(!sim.contains_node("Z"));
        assert!(sim.has_edge("A", "C"));
        assert!(!sim.has_edge("C", "A"));
        assert!(!sim.has_edge("A", "Z"));
        assert_eq!(sim.neighbors("A"), vec!["C", "B"]);
        assert!(sim.neighbors("Z").is_empty());
        assert_eq!(sim.nodes(), vec!["A", "B", "C"]);
        assert_eq!(sim.snapshot().edges.len(), 2);
        assert!(!sim.is_running());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let sim = Simulation::new();
        let log = Arc::new(EventLog::new());
        let id = sim.subscribe(log.clone());

        sim.add_node("A").unwrap();
        assert!(sim.unsubscribe(id));
        assert!(!sim.unsubscribe(id));
        sim.add_node("B").unwrap();

        assert_eq!(log.events(), vec![SimEvent::NodeAdded { id: "A".into() }]);
    }
}
