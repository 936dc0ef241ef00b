//! Domain models for the economy simulator

pub mod agent;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod state;

// Re-exports
pub use agent::{
    Agent, AgentKind, Beliefs, FirmState, HouseholdState, Inventory, Memory, Resource, Role,
};
pub use config::{ExperimentConfig, ExperimentParams, PopulationConfig, Tuning};
pub use ledger::{Ledger, LedgerEntry, TransferReason};
pub use metrics::MetricsSnapshot;
pub use state::{WorldState, CENTRAL_BANK_ID, GOVERNMENT_ID};
