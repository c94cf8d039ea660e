//! Simulation Control
//!
//! This module exposes the command surface consumed by a front end: a
//! [`Simulation`] owns one wait-for graph, applies node and edge commands to
//! it, runs deadlock detection and order resolution over it, and reports
//! everything that happens to registered [`SimulationObserver`]s.
//!
//! # Events
//!
//! Observers receive, in emission order:
//!
//! - `on_node_added` / `on_edge_added` after each accepted mutation
//! - `on_probe_step` once per probe evaluated during detection
//! - `on_deadlock_result` / `on_order_result` when an analysis finishes
//! - `on_reset` after the graph is cleared
//!
//! Delivery is synchronous. Pacing and animation belong to the front end,
//! which can also record events with an [`EventLog`] and replay them later
//! from JSON or MessagePack frames.
//!
//! # Concurrency
//!
//! A run executes to completion on the calling thread. While it runs, every
//! mutation and analysis command is rejected with [`SimError::Busy`], so the
//! graph snapshot being analysed is never modified mid-run.

mod config;
mod controller;
mod error;
mod event;
mod guard;
mod observer;

pub use config::SimulationConfig;
pub use controller::Simulation;
pub use error::{SimError, SimResult};
pub use event::{EventError, OrderOutcome, SimEvent};
pub use guard::RunGuard;
pub use observer::{EventLog, ObserverId, SimulationObserver};
