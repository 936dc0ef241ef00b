//! Orchestrator - the tick pipeline and run persistence
//!
//! See `engine.rs` for the kernel and `checkpoint.rs` for save/load.

pub mod checkpoint;
pub mod engine;

pub use engine::{step, Diagnostic, MechanismPlan, Simulation, SimulationError, StepResult};
