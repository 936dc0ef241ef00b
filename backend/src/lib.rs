//! Economy Simulator Core - Rust Engine
//!
//! Deterministic, discrete-time, agent-based economy. Households, firms,
//! banks, a government and a central bank exchange money and goods under
//! pluggable markets, behaviors and institutions; the kernel reports the
//! resulting macro statistics every tick.
//!
//! # Architecture
//!
//! - **core**: World initialization
//! - **models**: Domain types (Agent, Ledger, Config, WorldState)
//! - **settlement**: Accounting guard and invariant checker
//! - **markets**: Labor and goods market mechanisms
//! - **behavior**: Per-agent decision rules (cognition)
//! - **institutions**: System-wide rules (bankruptcy, taxes, welfare, bonds)
//! - **metrics**: Per-tick aggregates and export
//! - **orchestrator**: Tick pipeline, `Simulation`, checkpoints
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Every value transfer goes through the accounting guard and the ledger
//! 2. All randomness is deterministic (one seeded generator per run)
//! 3. A step is a pure function of the previous state
//! 4. FFI boundary is minimal and safe

pub mod behavior;
pub mod core;
pub mod institutions;
pub mod markets;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod settlement;

// Re-exports for convenience
pub use crate::core::init::{initialize, initialize_with_agents};
pub use models::{
    agent::{Agent, AgentKind, Resource, Role},
    config::{ExperimentConfig, ExperimentParams, PopulationConfig, Tuning},
    ledger::{LedgerEntry, TransferReason},
    metrics::MetricsSnapshot,
    state::{WorldState, CENTRAL_BANK_ID, GOVERNMENT_ID},
};
pub use orchestrator::{step, Diagnostic, Simulation, SimulationError, StepResult};
pub use rng::RngManager;
pub use settlement::{transfer_money, transfer_resource, TransferRefusal};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn econ_sim_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulation::PySimulation>()?;
    Ok(())
}
