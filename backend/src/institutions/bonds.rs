//! Bond yield
//!
//! Government pays every active bondholder `holdings × bond_yield` each
//! tick, subject to the treasury funding gate.

use crate::institutions::treasury_can_fund;
use crate::models::ledger::TransferReason;
use crate::models::state::{WorldState, GOVERNMENT_ID};
use crate::settlement::transfer_money;
use tracing::debug;

pub const DEFAULT_BOND_YIELD: f64 = 0.002;

/// Returns the number of interest payments made
pub fn pay_interest(state: &mut WorldState) -> usize {
    let rate = state
        .config()
        .params
        .extension_or("bond_yield", DEFAULT_BOND_YIELD);
    let holders: Vec<(String, f64)> = state
        .agents()
        .values()
        .filter(|a| a.is_active() && !a.is_sovereign() && a.bonds() > 0.0)
        .map(|a| (a.id().to_string(), a.bonds() * rate))
        .collect();

    let mut paid = 0;
    for (holder, interest) in holders {
        if !treasury_can_fund(state, interest) {
            debug!(holder = %holder, interest, "bond interest not funded");
            continue;
        }
        if transfer_money(state, GOVERNMENT_ID, &holder, interest, TransferReason::BondInterest)
            .is_ok()
        {
            paid += 1;
        }
    }
    paid
}
