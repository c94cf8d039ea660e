//! Simulation configuration.

use serde::{Deserialize, Serialize};

use super::error::{SimError, SimResult};

/// Settings for a [`Simulation`](super::Simulation).
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Prefix for auto-assigned process names (`P0`, `P1`, ...).
    pub node_prefix: String,

    /// Deliver `on_probe_step` to observers. Turning this off does not
    /// change the run or its result.
    pub emit_probe_steps: bool,

    /// Keep an internal log of every emitted event.
    pub record_events: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            node_prefix: "P".to_string(),
            emit_probe_steps: true,
            record_events: false,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field constraints.
    pub fn validate(&self) -> SimResult<()> {
        if self.node_prefix.is_empty() {
            return Err(SimError::config("node_prefix must not be empty"));
        }
        if self.node_prefix.chars().any(char::is_whitespace) {
            return Err(SimError::config("node_prefix must not contain whitespace"));
        }
        Ok(())
    }

    pub fn with_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.node_prefix = prefix.into();
        self
    }

    pub fn with_probe_steps(mut self, emit: bool) -> Self {
        self.emit_probe_steps = emit;
        self
    }

    pub fn with_recording(mut self, record: bool) -> Self {
        self.record_events = record;
        self
    }
}
