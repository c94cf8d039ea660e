//! Python Bindings
//!
//! Exposes [`Simulation`] to a Python front end. The front end issues the
//! five commands and pulls recorded events as JSON strings to animate at its
//! own pace.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::sim::{SimError, Simulation, SimulationConfig};

fn to_py_err(err: SimError) -> PyErr {
    match err {
        SimError::Busy => PyRuntimeError::new_err(err.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// Python-exposed simulation. Always records events.
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    inner: Simulation,
}

#[pymethods]
impl PySimulation {
    #[new]
    #[pyo3(signature = (node_prefix = None, emit_probe_steps = true))]
    fn new(node_prefix: Option<String>, emit_probe_steps: bool) -> PyResult<Self> {
        let mut config = SimulationConfig::default()
            .with_recording(true)
            .with_probe_steps(emit_probe_steps);
        if let Some(prefix) = node_prefix {
            config = config.with_node_prefix(prefix);
        }
        let inner = Simulation::with_config(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn add_node(&self, id: &str) -> PyResult<bool> {
        self.inner.add_node(id).map_err(to_py_err)
    }

    fn add_process(&self) -> PyResult<String> {
        self.inner.add_process().map_err(to_py_err)
    }

    /// Returns True if the edge was added, False for a self-edge or duplicate.
    fn add_edge(&self, source: &str, target: &str) -> PyResult<bool> {
        self.inner
            .add_edge(source, target)
            .map(|insertion| insertion.is_inserted())
            .map_err(to_py_err)
    }

    fn detect_deadlock(&self) -> PyResult<bool> {
        self.inner.detect_deadlock().map_err(to_py_err)
    }

    fn compute_order(&self) -> PyResult<Vec<String>> {
        self.inner.compute_order().map_err(to_py_err)
    }

    fn reset(&self) -> PyResult<()> {
        self.inner.reset().map_err(to_py_err)
    }

    /// Remove and return recorded events as JSON objects.
    fn drain_events(&self) -> PyResult<Vec<String>> {
        self.inner
            .take_recorded_events()
            .iter()
            .map(|event| {
                event
                    .to_json()
                    .map_err(|e| PyRuntimeError::new_err(e.to_string()))
            })
            .collect()
    }

    #[getter]
    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    #[getter]
    fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "Simulation(nodes={}, edges={})",
            self.inner.node_count(),
            self.inner.edge_count()
        )
    }
}
