//! Probe messages.

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// One in-flight detection message.
///
/// `initiator` started the probe chain, `sender` forwarded this hop and
/// `receiver` is the process it was delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Probe {
    pub initiator: NodeId,
    pub sender: NodeId,
    pub receiver: NodeId,
}

impl Probe {
    /// The first probe sent along a direct edge `initiator -> receiver`.
    pub fn seed(initiator: NodeId, receiver: NodeId) -> Self {
        Self {
            initiator,
            sender: initiator,
            receiver,
        }
    }

    /// The probe the receiver forwards to one of its own successors.
    pub fn forward(&self, next: NodeId) -> Self {
        Self {
            initiator: self.initiator,
            sender: self.receiver,
            receiver: next,
        }
    }

    /// The probe came back to the process that started it.
    pub fn closes_cycle(&self) -> bool {
        self.receiver == self.initiator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_shifts_receiver_to_sender() {
        let a = NodeId::from_index(0);
        let b = NodeId::from_index(1);
        let c = NodeId::from_index(2);

        let seed = Probe::seed(a, b);
        assert_eq!(seed.sender, a);
        assert!(!seed.closes_cycle());

        let hop = seed.forward(c);
        assert_eq!(hop, Probe { initiator: a, sender: b, receiver: c });

        assert!(hop.forward(a).closes_cycle());
    }
}
