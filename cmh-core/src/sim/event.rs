//! Simulation Events
//!
//! Everything the controller reports to the front end is a [`SimEvent`].
//! Events are delivered to observers as method calls, and can also be
//! recorded and shipped as JSON or MessagePack frames so a front end can
//! replay and animate a run at its own pace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::observer::SimulationObserver;

/// Errors from encoding or decoding event frames
#[derive(Debug, Error)]
pub enum EventError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Result of an execution-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderOutcome {
    /// Every process, ordered so each edge points forward.
    Sequence { order: Vec<String> },
    /// The graph is cyclic; no order exists.
    CycleDetected { remaining: Vec<String> },
}

/// One event emitted toward the front end, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    NodeAdded {
        id: String,
    },
    EdgeAdded {
        source: String,
        target: String,
        /// The reverse edge already existed.
        mutual: bool,
    },
    ProbeStep {
        initiator: String,
        sender: String,
        receiver: String,
    },
    DeadlockResult {
        found: bool,
    },
    OrderResult {
        outcome: OrderOutcome,
    },
    Reset,
}

impl SimEvent {
    /// Deliver this event to the matching observer callback.
    pub fn dispatch(&self, observer: &dyn SimulationObserver) {
        match self {
            SimEvent::NodeAdded { id } => observer.on_node_added(id),
            SimEvent::EdgeAdded {
                source,
                target,
                mutual,
            } => observer.on_edge_added(source, target, *mutual),
            SimEvent::ProbeStep {
                initiator,
                sender,
                receiver,
            } => observer.on_probe_step(initiator, sender, receiver),
            SimEvent::DeadlockResult { found } => observer.on_deadlock_result(*found),
            SimEvent::OrderResult { outcome } => observer.on_order_result(outcome),
            SimEvent::Reset => observer.on_reset(),
        }
    }

    /// Encode as a JSON object.
    pub fn to_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as a MessagePack map.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, EventError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode a frame produced by [`to_msgpack`](Self::to_msgpack).
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, EventError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
