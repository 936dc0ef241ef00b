//! Fiscal institutions
//!
//! Taxes and transfers that run after the markets, so they act on what
//! happened this tick.

use crate::institutions::treasury_can_fund;
use crate::models::agent::{AgentKind, Resource};
use crate::models::ledger::TransferReason;
use crate::models::state::{WorldState, GOVERNMENT_ID};
use crate::settlement::transfer_money;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_WEALTH_TAX_THRESHOLD: f64 = 1_000.0;
pub const DEFAULT_WEALTH_TAX_RATE: f64 = 0.02;
pub const DEFAULT_WELFARE_FLOOR_MULTIPLIER: f64 = 1.0;

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Government payout through the funding gate
fn government_pays(state: &mut WorldState, to: &str, amount: f64, reason: TransferReason) -> bool {
    if !treasury_can_fund(state, amount) {
        debug!(receiver = to, amount, ?reason, "payout not funded");
        return false;
    }
    transfer_money(state, GOVERNMENT_ID, to, amount, reason).is_ok()
}

/// Flat tax on every wage payment households received this tick
///
/// Each wage entry is taxed separately, rounded to cents. A household that
/// already spent the wage is skipped.
pub fn income_tax(state: &mut WorldState) -> usize {
    let rate = state.config().params.income_tax_rate;
    if rate <= 0.0 {
        return 0;
    }

    let tick = state.tick();
    let assessments: Vec<(String, f64)> = state
        .ledger()
        .for_tick_with_reason(tick, TransferReason::WagePayment)
        .filter(|e| {
            state
                .agent(e.receiver())
                .is_some_and(|a| a.kind() == AgentKind::Household)
        })
        .map(|e| (e.receiver().to_string(), round_to_cents(e.amount() * rate)))
        .collect();

    let mut collected = 0;
    for (payer, tax) in assessments {
        match transfer_money(state, &payer, GOVERNMENT_ID, tax, TransferReason::IncomeTax) {
            Ok(_) => collected += 1,
            Err(refusal) => debug!(payer = %payer, tax, %refusal, "income tax not collected"),
        }
    }
    collected
}

/// Tax on cash above a threshold, for every active non-sovereign agent
pub fn wealth_tax(state: &mut WorldState) -> usize {
    let params = &state.config().params;
    let threshold = params.extension_or("wealth_tax_threshold", DEFAULT_WEALTH_TAX_THRESHOLD);
    let rate = params.extension_or("wealth_tax_rate", DEFAULT_WEALTH_TAX_RATE);

    let assessments: Vec<(String, f64)> = state
        .agents()
        .values()
        .filter(|a| a.is_active() && !a.is_sovereign() && a.cash() > threshold)
        .map(|a| (a.id().to_string(), (a.cash() - threshold) * rate))
        .collect();

    assessments
        .into_iter()
        .filter(|(payer, tax)| {
            transfer_money(state, payer, GOVERNMENT_ID, *tax, TransferReason::WealthTax).is_ok()
        })
        .count()
}

/// Top up every active household whose cash is below the cost of its need
///
/// The food cost is estimated from the last CPI, or from the household's
/// own price belief before any trade has happened.
pub fn emergency_welfare(state: &mut WorldState) -> usize {
    let multiplier = state
        .config()
        .params
        .extension_or("welfare_floor_multiplier", DEFAULT_WELFARE_FLOOR_MULTIPLIER);
    let last_cpi = state
        .latest_metrics()
        .map(|m| m.cpi)
        .filter(|cpi| *cpi > 0.0);

    let top_ups: Vec<(String, f64)> = state
        .agents()
        .values()
        .filter(|a| a.is_active())
        .filter_map(|a| {
            let household = a.as_household()?;
            let price = last_cpi.unwrap_or_else(|| a.beliefs.price(Resource::ConsumerGoods));
            let floor = household.need as f64 * price * multiplier;
            (a.cash() < floor).then(|| (a.id().to_string(), floor - a.cash()))
        })
        .collect();

    top_ups
        .into_iter()
        .filter(|(id, amount)| government_pays(state, id, *amount, TransferReason::EmergencyWelfare))
        .count()
}

/// Refund each active firm `subsidy_rate` of the wages it paid this tick
pub fn firm_subsidy(state: &mut WorldState) -> usize {
    let rate = state.config().params.subsidy_rate;
    if rate <= 0.0 {
        return 0;
    }

    let tick = state.tick();
    let mut wage_bills: BTreeMap<String, f64> = BTreeMap::new();
    for entry in state
        .ledger()
        .for_tick_with_reason(tick, TransferReason::WagePayment)
    {
        *wage_bills.entry(entry.sender().to_string()).or_insert(0.0) += entry.amount();
    }

    let mut paid = 0;
    for (firm, wages) in wage_bills {
        let is_live_firm = state
            .agent(&firm)
            .is_some_and(|a| a.is_active() && a.kind() == AgentKind::Firm);
        if is_live_firm && government_pays(state, &firm, wages * rate, TransferReason::Subsidy) {
            paid += 1;
        }
    }
    paid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agent::Agent;
    use crate::models::config::ExperimentConfig;
    use crate::models::ledger::LedgerEntry;

    fn world(config: ExperimentConfig, agents: Vec<Agent>) -> WorldState {
        let mut agents = agents;
        agents.push(Agent::government(GOVERNMENT_ID));
        let mut state = WorldState::new(config, agents);
        state.advance_tick();
        state
    }

    fn record_wage(state: &mut WorldState, firm: &str, household: &str, amount: f64) {
        let tick = state.tick();
        state
            .ledger_mut()
            .record(LedgerEntry::new(tick, firm, household, amount, TransferReason::WagePayment));
    }

    #[test]
    fn test_income_tax_per_wage_entry_rounded() {
        let mut config = ExperimentConfig::bare("tax", 1);
        config.params.income_tax_rate = 0.15;
        let mut state = world(
            config,
            vec![
                Agent::household("hh").with_cash(100.0),
                Agent::firm("firm").with_cash(100.0),
            ],
        );
        record_wage(&mut state, "firm", "hh", 10.33);

        assert_eq!(income_tax(&mut state), 1);
        let tax = state
            .ledger()
            .for_tick_with_reason(1, TransferReason::IncomeTax)
            .next()
            .map(|e| e.amount());
        assert_eq!(tax, Some(1.55));
    }

    #[test]
    fn test_income_tax_ignores_previous_ticks() {
        let mut state = world(
            ExperimentConfig::bare("tax", 1),
            vec![Agent::household("hh").with_cash(100.0)],
        );
        record_wage(&mut state, "firm", "hh", 10.0);
        state.advance_tick();

        assert_eq!(income_tax(&mut state), 0);
        assert_eq!(state.agent("hh").unwrap().cash(), 100.0);
    }

    #[test]
    fn test_wealth_tax_above_threshold() {
        let mut state = world(
            ExperimentConfig::bare("wealth", 1),
            vec![
                Agent::firm("rich").with_cash(2_000.0),
                Agent::household("poor").with_cash(999.0),
            ],
        );

        assert_eq!(wealth_tax(&mut state), 1);
        assert_eq!(state.agent("rich").unwrap().cash(), 1_980.0);
        assert_eq!(state.agent("poor").unwrap().cash(), 999.0);
        assert_eq!(state.agent(GOVERNMENT_ID).unwrap().cash(), 20.0);
    }

    #[test]
    fn test_welfare_tops_up_to_belief_floor() {
        let mut hungry = Agent::household("hungry").with_cash(4.0);
        hungry.beliefs.set_price(Resource::ConsumerGoods, 10.0);
        let mut fed = Agent::household("fed").with_cash(50.0);
        fed.beliefs.set_price(Resource::ConsumerGoods, 10.0);
        let mut state = world(ExperimentConfig::bare("welfare", 1), vec![hungry, fed]);

        assert_eq!(emergency_welfare(&mut state), 1);
        assert_eq!(state.agent("hungry").unwrap().cash(), 10.0);
        assert_eq!(state.agent("fed").unwrap().cash(), 50.0);
    }

    #[test]
    fn test_welfare_respects_funding_gate() {
        let mut config = ExperimentConfig::bare("welfare", 1);
        config.params.money_printing = false;
        let mut hungry = Agent::household("hungry");
        hungry.beliefs.set_price(Resource::ConsumerGoods, 10.0);
        let mut state = world(config, vec![hungry]);

        assert_eq!(emergency_welfare(&mut state), 0);
        assert!(state.ledger().is_empty());
    }

    #[test]
    fn test_subsidy_refunds_wage_bill() {
        let mut config = ExperimentConfig::bare("subsidy", 1);
        config.params.subsidy_rate = 0.5;
        let mut state = world(
            config,
            vec![
                Agent::firm("firm").with_cash(0.0),
                Agent::household("a"),
                Agent::household("b"),
            ],
        );
        record_wage(&mut state, "firm", "a", 10.0);
        record_wage(&mut state, "firm", "b", 10.0);

        assert_eq!(firm_subsidy(&mut state), 1);
        assert_eq!(state.agent("firm").unwrap().cash(), 10.0);
    }
}
