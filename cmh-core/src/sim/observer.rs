//! Observer types for the simulation.
//!
//! An observer receives every event the controller emits, synchronously and
//! in emission order. All callbacks default to no-ops so an observer only
//! implements what it cares about.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::event::{OrderOutcome, SimEvent};

/// Unique identifier for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Generate a new unique observer ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives simulation events.
///
/// Callbacks run on the thread that issued the command, while the command
/// is still executing. During a detection or ordering run an observer may
/// query the simulation, but mutation and analysis commands fail with
/// [`SimError::Busy`](super::SimError::Busy).
pub trait SimulationObserver: Send + Sync {
    fn on_node_added(&self, _id: &str) {}

    fn on_edge_added(&self, _source: &str, _target: &str, _mutual: bool) {}

    /// One call per probe evaluated during a detection run.
    fn on_probe_step(&self, _initiator: &str, _sender: &str, _receiver: &str) {}

    fn on_deadlock_result(&self, _found: bool) {}

    fn on_order_result(&self, _outcome: &OrderOutcome) {}

    fn on_reset(&self) {}
}

/// Observer that records every event it receives.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SimEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events.
    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().clone()
    }

    /// Remove and return the recorded events.
    pub fn drain(&self) -> Vec<SimEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: SimEvent) {
        self.events.lock().push(event);
    }
}

impl SimulationObserver for EventLog {
    fn on_node_added(&self, id: &str) {
        self.push(SimEvent::NodeAdded { id: id.to_string() });
    }

    fn on_edge_added(&self, source: &str, target: &str, mutual: bool) {
        self.push(SimEvent::EdgeAdded {
            source: source.to_string(),
            target: target.to_string(),
            mutual,
        });
    }

    fn on_probe_step(&self, initiator: &str, sender: &str, receiver: &str) {
        self.push(SimEvent::ProbeStep {
            initiator: initiator.to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
        });
    }

    fn on_deadlock_result(&self, found: bool) {
        self.push(SimEvent::DeadlockResult { found });
    }

    fn on_order_result(&self, outcome: &OrderOutcome) {
        self.push(SimEvent::OrderResult {
            outcome: outcome.clone(),
        });
    }

    fn on_reset(&self) {
        self.push(SimEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_ids_are_unique() {
        let id1 = ObserverId::new();
        let id2 = ObserverId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn event_log_records_dispatched_events() {
        let log = EventLog::new();
        let events = vec![
            SimEvent::NodeAdded { id: "A".into() },
            SimEvent::EdgeAdded {
                source: "A".into(),
                target: "B".into(),
                mutual: false,
            },
            SimEvent::DeadlockResult { found: false },
            SimEvent::Reset,
        ];

        for event in &events {
            event.dispatch(&log);
        }

        assert_eq!(log.len(), 4);
        assert_eq!(log.events(), events);
    }

    #[test]
    fn drain_empties_the_log() {
        let log = EventLog::new();
        log.on_reset();

        assert_eq!(log.drain(), vec![SimEvent::Reset]);
        assert!(log.is_empty());
    }

    #[test]
    fn default_callbacks_are_noops() {
        struct Silent;
        impl SimulationObserver for Silent {}

        SimEvent::Reset.dispatch(&Silent);
        SimEvent::DeadlockResult { found: true }.dispatch(&Silent);
    }
}
