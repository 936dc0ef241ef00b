//! Bankruptcy
//!
//! A firm whose insolvency streak reached the threshold is liquidated: its
//! residual cash goes to government, its workers are let go, and it is
//! deactivated for good. The standard and forgiving variants differ only
//! in the threshold.

use crate::models::agent::AgentKind;
use crate::models::ledger::TransferReason;
use crate::models::state::{WorldState, GOVERNMENT_ID};
use crate::settlement::transfer_money;
use tracing::{info, warn};

/// Liquidate every active firm with `insolvency_streak >= threshold`
///
/// Returns the number of firms liquidated.
pub fn liquidate_insolvent(state: &mut WorldState, threshold: u32) -> usize {
    let insolvent: Vec<String> = state
        .agents()
        .values()
        .filter(|a| a.is_active() && a.kind() == AgentKind::Firm)
        .filter(|a| a.as_firm().is_some_and(|f| f.insolvency_streak >= threshold))
        .map(|a| a.id().to_string())
        .collect();

    for firm_id in &insolvent {
        liquidate(state, firm_id);
    }
    insolvent.len()
}

fn liquidate(state: &mut WorldState, firm_id: &str) {
    let residual = state.agent(firm_id).map_or(0.0, |a| a.cash());
    if residual > 0.0 {
        if let Err(refusal) = transfer_money(
            state,
            firm_id,
            GOVERNMENT_ID,
            residual,
            TransferReason::BankruptcyLiquidation,
        ) {
            warn!(firm = firm_id, %refusal, "liquidation sweep refused");
        }
    }

    let mut released = 0;
    for agent in state.agents_mut().values_mut() {
        if let Some(household) = agent.as_household_mut() {
            if household.employed_at.as_deref() == Some(firm_id) {
                household.employed_at = None;
                released += 1;
            }
        }
    }

    if let Some(firm) = state.agents_mut().get_mut(firm_id) {
        firm.deactivate();
    }
    info!(tick = state.tick(), firm = firm_id, residual, released, "firm liquidated");
}
