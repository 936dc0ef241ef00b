//! Per-tick accounting invariant checker
//!
//! A diagnostic pass, not a gate: it never reverses a transfer. Its job is
//! to make accounting bugs visible. A non-finite money supply is the one
//! condition that stops the run.

use crate::models::state::WorldState;
use crate::orchestrator::SimulationError;
use tracing::{error, warn};

/// Outcome of one invariant pass
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantReport {
    /// Recomputed sum of non-sovereign cash
    pub money_supply: f64,
    /// Non-sovereign agents below zero by more than the tolerance
    pub negative_cash: Vec<(String, f64)>,
}

/// Recompute the money supply and flag overdrawn agents
///
/// # Errors
///
/// `SimulationError::NonFiniteMoneySupply` when the supply is NaN or infinite.
pub fn check_invariants(state: &WorldState) -> Result<InvariantReport, SimulationError> {
    let money_supply = state.money_supply();
    if !money_supply.is_finite() {
        error!(tick = state.tick(), money_supply, "money supply is not finite");
        return Err(SimulationError::NonFiniteMoneySupply {
            tick: state.tick(),
            value: money_supply,
        });
    }

    let tolerance = state.config().tuning.negative_cash_tolerance;
    let negative_cash: Vec<(String, f64)> = state
        .agents()
        .values()
        .filter(|a| !a.is_sovereign() && a.cash() < -tolerance)
        .map(|a| (a.id().to_string(), a.cash()))
        .collect();

    for (id, cash) in &negative_cash {
        warn!(tick = state.tick(), agent = %id, cash, "non-sovereign agent below zero");
    }

    Ok(InvariantReport {
        money_supply,
        negative_cash,
    })
}
