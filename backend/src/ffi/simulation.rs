//! PyO3 wrapper for Simulation

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::metrics::export_json;
use crate::models::config::ExperimentConfig;
use crate::orchestrator::{checkpoint, Simulation as RustSimulation};

/// Python wrapper for the Rust simulation
///
/// # Example (from Python)
///
/// ```python
/// import json
/// from econ_sim_core import Simulation
///
/// sim = Simulation(json.dumps({"seed": 7, "population": {"households": 20}}))
/// for _ in range(10):
///     m = sim.step()
///     print(f"Tick {m['tick']}: GDP {m['gdp']:.2f}, CPI {m['cpi']:.2f}")
/// ```
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    inner: RustSimulation,
}

#[pymethods]
impl PySimulation {
    /// Create a simulation from a JSON experiment configuration
    ///
    /// Raises ValueError if the JSON does not parse or the config is invalid.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let config: ExperimentConfig = serde_json::from_str(config_json)
            .map_err(|e| PyValueError::new_err(format!("Invalid config JSON: {}", e)))?;
        let inner = RustSimulation::new(config)
            .map_err(|e| PyValueError::new_err(format!("Failed to create simulation: {}", e)))?;
        Ok(PySimulation { inner })
    }

    /// Resume from a checkpoint produced by `save_checkpoint`
    #[staticmethod]
    fn from_checkpoint(json: &str) -> PyResult<Self> {
        let state = checkpoint::load(json)
            .map_err(|e| PyValueError::new_err(format!("Failed to load checkpoint: {}", e)))?;
        Ok(PySimulation {
            inner: RustSimulation::from_state(state),
        })
    }

    /// Execute one tick and return its metrics
    ///
    /// The dict holds the snapshot fields plus `diagnostics`, a list of
    /// diagnostic messages for the tick.
    fn step(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let diagnostics = self
            .inner
            .tick()
            .map_err(|e| PyRuntimeError::new_err(format!("Tick execution failed: {}", e)))?;

        let dict = PyDict::new_bound(py);
        if let Some(m) = self.inner.latest_metrics() {
            dict.set_item("tick", m.tick)?;
            dict.set_item("gdp", m.gdp)?;
            dict.set_item("cpi", m.cpi)?;
            dict.set_item("unemployment_rate", m.unemployment_rate)?;
            dict.set_item("money_supply", m.money_supply)?;
            dict.set_item("transaction_count", m.transaction_count)?;
            dict.set_item("average_wage", m.average_wage)?;
            dict.set_item("active_firms", m.active_firms)?;
        }
        let messages: Vec<String> = diagnostics.iter().map(|d| format!("{:?}", d)).collect();
        dict.set_item("diagnostics", messages)?;
        Ok(dict.unbind())
    }

    /// Current simulation tick
    #[getter]
    fn tick(&self) -> u64 {
        self.inner.state().tick()
    }

    /// Metrics history as JSON
    fn metrics_json(&self) -> PyResult<String> {
        export_json(self.inner.state()).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Full world state as JSON
    fn state_json(&self) -> PyResult<String> {
        serde_json::to_string(self.inner.state())
            .map_err(|e| PyRuntimeError::new_err(format!("State serialization failed: {}", e)))
    }

    fn save_checkpoint(&self) -> PyResult<String> {
        checkpoint::save(self.inner.state()).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}
