//! CMH Core
//!
//! This crate models wait-for relations between processes as a directed
//! graph and decides whether the graph is deadlocked using the
//! Chandy-Misra-Haas probe-propagation algorithm. It implements:
//!
//! - The wait-for graph model
//! - Probe-based deadlock detection with an observable probe trace
//! - Execution-order resolution (topological sort) for acyclic graphs
//! - A simulation controller that drives all of the above for a front end
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! - `graph`: Wait-for graph and execution-order resolver
//! - `probe`: Probe messages and the detection engine
//! - `sim`: Simulation controller, observers and events
//!
//! # Example
//!
//! ```
//! use cmh_core::sim::Simulation;
//!
//! let sim = Simulation::new();
//! let a = sim.add_process().unwrap(); // "P0"
//! let b = sim.add_process().unwrap(); // "P1"
//! let c = sim.add_process().unwrap(); // "P2"
//!
//! sim.add_edge(&a, &b).unwrap();
//! sim.add_edge(&b, &c).unwrap();
//! assert!(!sim.detect_deadlock().unwrap());
//! assert_eq!(sim.compute_order().unwrap(), vec!["P0", "P1", "P2"]);
//!
//! sim.add_edge(&c, &a).unwrap();
//! assert!(sim.detect_deadlock().unwrap());
//! ```

pub mod graph;
pub mod probe;
pub mod sim;

#[cfg(feature = "python")]
mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types and functions.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PySimulation>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
