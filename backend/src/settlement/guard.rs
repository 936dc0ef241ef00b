//! Accounting guard
//!
//! Every value movement between agents goes through [`transfer_money`] or
//! [`transfer_resource`]. A refusal is a normal negative result the caller
//! branches on: it is returned before anything is touched, so the state is
//! exactly as it was.
//!
//! Sovereign senders (government, central bank) skip the balance check;
//! they create money when they pay past zero and destroy it when they are
//! paid.

use crate::models::agent::{Agent, Resource};
use crate::models::ledger::{LedgerEntry, TransferReason};
use crate::models::state::WorldState;
use thiserror::Error;
use tracing::trace;

/// Reasons a transfer did not happen
#[derive(Debug, Error, PartialEq)]
pub enum TransferRefusal {
    #[error("Transfer amount must be positive and finite, got {amount}")]
    NonPositiveAmount { amount: f64 },

    #[error("Transfer quantity must be positive")]
    ZeroQuantity,

    #[error("Sender and receiver are the same agent: {0}")]
    SelfTransfer(String),

    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    #[error("Agent is inactive: {0}")]
    InactiveAgent(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Insufficient stock of {resource:?}: required {required}, available {available}")]
    InsufficientStock {
        resource: Resource,
        required: u64,
        available: u64,
    },
}

fn live_agent<'a>(state: &'a WorldState, id: &str) -> Result<&'a Agent, TransferRefusal> {
    let agent = state
        .agent(id)
        .ok_or_else(|| TransferRefusal::UnknownAgent(id.to_string()))?;
    if !agent.is_active() {
        return Err(TransferRefusal::InactiveAgent(id.to_string()));
    }
    Ok(agent)
}

/// Move `amount` of cash from `from` to `to` and record it in the ledger
///
/// # Returns
///
/// - `Ok(LedgerEntry)` - the entry appended for this transfer
/// - `Err(TransferRefusal)` - nothing changed
pub fn transfer_money(
    state: &mut WorldState,
    from: &str,
    to: &str,
    amount: f64,
    reason: TransferReason,
) -> Result<LedgerEntry, TransferRefusal> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(TransferRefusal::NonPositiveAmount { amount });
    }
    if from == to {
        return Err(TransferRefusal::SelfTransfer(from.to_string()));
    }

    let sender = live_agent(state, from)?;
    live_agent(state, to)?;

    if !sender.can_pay(amount) {
        return Err(TransferRefusal::InsufficientFunds {
            required: amount,
            available: sender.cash(),
        });
    }

    let tick = state.tick();
    let agents = state.agents_mut();
    if let Some(sender) = agents.get_mut(from) {
        sender.debit(amount);
    }
    if let Some(receiver) = agents.get_mut(to) {
        receiver.credit(amount);
    }

    let entry = LedgerEntry::new(tick, from, to, amount, reason);
    state.ledger_mut().record(entry.clone());
    trace!(tick, from, to, amount, ?reason, "money transfer");

    Ok(entry)
}

/// Move `qty` units of `resource` from `from` to `to`
pub fn transfer_resource(
    state: &mut WorldState,
    from: &str,
    to: &str,
    resource: Resource,
    qty: u64,
) -> Result<(), TransferRefusal> {
    if qty == 0 {
        return Err(TransferRefusal::ZeroQuantity);
    }
    if from == to {
        return Err(TransferRefusal::SelfTransfer(from.to_string()));
    }

    let held = live_agent(state, from)?.inventory().get(resource);
    live_agent(state, to)?;

    if held < qty {
        return Err(TransferRefusal::InsufficientStock {
            resource,
            required: qty,
            available: held,
        });
    }

    let agents = state.agents_mut();
    if let Some(sender) = agents.get_mut(from) {
        sender.inventory.remove(resource, qty);
    }
    if let Some(receiver) = agents.get_mut(to) {
        receiver.inventory.add(resource, qty);
    }
    trace!(from, to, ?resource, qty, "resource transfer");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExperimentConfig;
    use crate::models::state::GOVERNMENT_ID;

    fn test_state() -> WorldState {
        let agents = vec![
            Agent::household("hh").with_cash(50.0),
            Agent::firm("firm")
                .with_cash(0.0)
                .with_stock(Resource::ConsumerGoods, 3),
            Agent::government(GOVERNMENT_ID),
        ];
        WorldState::new(ExperimentConfig::bare("guard", 1), agents)
    }

    #[test]
    fn test_sovereign_pays_past_zero() {
        let mut state = test_state();
        let entry =
            transfer_money(&mut state, GOVERNMENT_ID, "hh", 75.0, TransferReason::Subsidy).unwrap();

        assert_eq!(entry.amount(), 75.0);
        assert_eq!(state.agent(GOVERNMENT_ID).unwrap().cash(), -75.0);
        assert_eq!(state.agent("hh").unwrap().cash(), 125.0);
    }

    #[test]
    fn test_exact_balance_is_allowed() {
        let mut state = test_state();
        assert!(transfer_money(&mut state, "hh", "firm", 50.0, TransferReason::GoodsPurchase).is_ok());
        assert_eq!(state.agent("hh").unwrap().cash(), 0.0);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        let mut state = test_state();
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = transfer_money(&mut state, "hh", "firm", amount, TransferReason::WagePayment);
            assert!(matches!(result, Err(TransferRefusal::NonPositiveAmount { .. })));
        }
        assert!(state.ledger().is_empty());
    }

    #[test]
    fn test_self_transfer_refused() {
        let mut state = test_state();
        let result = transfer_money(&mut state, "hh", "hh", 1.0, TransferReason::WagePayment);
        assert_eq!(result, Err(TransferRefusal::SelfTransfer("hh".to_string())));
    }

    #[test]
    fn test_inactive_receiver_refused() {
        let mut state = test_state();
        state.agents_mut().get_mut("firm").unwrap().deactivate();

        let result = transfer_money(&mut state, "hh", "firm", 1.0, TransferReason::GoodsPurchase);
        assert_eq!(result, Err(TransferRefusal::InactiveAgent("firm".to_string())));
        assert_eq!(state.agent("hh").unwrap().cash(), 50.0);
    }

    #[test]
    fn test_resource_transfer() {
        let mut state = test_state();
        transfer_resource(&mut state, "firm", "hh", Resource::ConsumerGoods, 2).unwrap();
        assert_eq!(state.agent("firm").unwrap().inventory().get(Resource::ConsumerGoods), 1);
        assert_eq!(state.agent("hh").unwrap().inventory().get(Resource::ConsumerGoods), 2);

        let refused = transfer_resource(&mut state, "firm", "hh", Resource::ConsumerGoods, 2);
        assert_eq!(
            refused,
            Err(TransferRefusal::InsufficientStock {
                resource: Resource::ConsumerGoods,
                required: 2,
                available: 1,
            })
        );
        assert!(state.ledger().is_empty());
    }
}
