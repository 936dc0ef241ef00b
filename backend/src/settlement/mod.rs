//! Settlement Module
//!
//! The accounting guard: the single choke-point for every transfer of money
//! or goods between agents, plus the per-tick invariant checker.
//!
//! # Critical Invariants
//!
//! 1. **Atomicity**: a transfer debits the sender AND credits the receiver, or neither
//! 2. **Exact Legs**: both legs move the identical amount recorded in the ledger
//! 3. **Solvency**: non-sovereign senders never pay more than they hold
//! 4. **Quiet Refusal**: a refused transfer changes nothing and logs nothing
//!
//! # Example
//!
//! ```rust
//! use econ_sim_core::{Agent, ExperimentConfig, TransferReason};
//! use econ_sim_core::core::init::initialize_with_agents;
//! use econ_sim_core::settlement::transfer_money;
//!
//! let agents = vec![
//!     Agent::household("hh-0001").with_cash(100.0),
//!     Agent::firm("firm-001"),
//! ];
//! let mut state = initialize_with_agents(ExperimentConfig::bare("doc", 1), agents).unwrap();
//!
//! let entry = transfer_money(&mut state, "hh-0001", "firm-001", 10.0, TransferReason::GoodsPurchase).unwrap();
//! assert_eq!(entry.amount(), 10.0);
//! assert_eq!(state.agent("hh-0001").unwrap().cash(), 90.0);
//!
//! // Refusal: no state change, no ledger entry
//! assert!(transfer_money(&mut state, "hh-0001", "firm-001", 1_000.0, TransferReason::GoodsPurchase).is_err());
//! assert_eq!(state.ledger().len(), 1);
//! ```

pub mod guard;
pub mod invariants;

// Re-export public API
pub use guard::{transfer_money, transfer_resource, TransferRefusal};
pub use invariants::{check_invariants, InvariantReport};
