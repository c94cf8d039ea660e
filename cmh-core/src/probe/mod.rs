//! Probe-Based Deadlock Detection
//!
//! This module implements the Chandy-Misra-Haas edge-chasing algorithm over
//! a [`WaitForGraph`](crate::graph::WaitForGraph).
//!
//! # Concepts
//!
//! ## Probes
//!
//! A probe is a triple (initiator, sender, receiver). A blocked process
//! initiates probes along its outgoing wait-for edges; every process that
//! receives a probe forwards it along its own outgoing edges. A probe that
//! arrives back at its initiator proves the initiator is on a cycle, and is
//! therefore deadlocked.
//!
//! ## Traces
//!
//! The sequence of evaluated probes is observable. Callers pass a step
//! callback to [`ProbeEngine::run`] and receive each probe synchronously, in
//! a deterministic order fixed by node and edge insertion order. The engine
//! itself has no notion of timing or animation.

mod engine;
mod message;

pub use engine::{Detection, ProbeEngine};
pub use message::Probe;
