//! Deterministic random number generation
//!
//! Uses the Mulberry32 algorithm over a single 32-bit state word.
//! CRITICAL: All randomness in the simulator MUST go through this module.

mod mulberry;

pub use mulberry::RngManager;
