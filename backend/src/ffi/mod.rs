//! Python bindings
//!
//! Thin PyO3 wrapper around [`crate::Simulation`]. Configuration and state
//! cross the boundary as JSON strings; per-tick metrics come back as dicts.

pub mod simulation;
