//! Metrics
//!
//! Aggregates one tick's ledger slice and the agent population into a
//! [`MetricsSnapshot`], and serializes the retained history for export.

use crate::models::agent::AgentKind;
use crate::models::ledger::TransferReason;
use crate::models::metrics::MetricsSnapshot;
use crate::models::state::WorldState;
use crate::orchestrator::SimulationError;
use serde::Serialize;

/// Read the current tick's aggregates
///
/// `money_supply` is the figure the invariant checker recomputed. CPI falls
/// back to the previous snapshot's value when no goods traded this tick.
pub fn snapshot(state: &WorldState, money_supply: f64) -> MetricsSnapshot {
    let tick = state.tick();
    let ledger = state.ledger();

    let (gdp, transaction_count) = ledger
        .for_tick_with_reason(tick, TransferReason::GoodsPurchase)
        .fold((0.0, 0usize), |(sum, n), e| (sum + e.amount(), n + 1));
    let cpi = if transaction_count > 0 {
        gdp / transaction_count as f64
    } else {
        state.latest_metrics().map_or(0.0, |m| m.cpi)
    };

    let (wage_total, wage_count) = ledger
        .for_tick_with_reason(tick, TransferReason::WagePayment)
        .fold((0.0, 0usize), |(sum, n), e| (sum + e.amount(), n + 1));
    let average_wage = if wage_count > 0 {
        wage_total / wage_count as f64
    } else {
        0.0
    };

    let households: Vec<_> = state
        .agents()
        .values()
        .filter(|a| a.is_active() && a.kind() == AgentKind::Household)
        .collect();
    let unemployed = households.iter().filter(|a| a.employer().is_none()).count();
    let unemployment_rate = if households.is_empty() {
        0.0
    } else {
        unemployed as f64 / households.len() as f64
    };

    MetricsSnapshot {
        tick,
        gdp,
        cpi,
        unemployment_rate,
        money_supply,
        transaction_count,
        average_wage,
        active_firms: state.active_ids(AgentKind::Firm).len(),
    }
}

#[derive(Serialize)]
struct MetricsExport<'a> {
    experiment_id: &'a str,
    tick: u64,
    metrics: Vec<&'a MetricsSnapshot>,
}

/// Serialize the metrics history, keyed by experiment id and current tick
pub fn export_json(state: &WorldState) -> Result<String, SimulationError> {
    let export = MetricsExport {
        experiment_id: &state.config().id,
        tick: state.tick(),
        metrics: state.metrics().collect(),
    };
    serde_json::to_string_pretty(&export)
        .map_err(|e| SimulationError::Serialization(format!("Metrics export failed: {}", e)))
}
