//! Goods market with random matching
//!
//! Firms are shuffled once; each household with unmet need then buys one
//! unit at a time from the cheapest stocked firm (ties go to the earlier
//! firm in the shuffled order) until its need is covered, no firm has stock,
//! or it cannot afford the cheapest unit. With a sales tax the buyer pays
//! the tax leg first; a unit is either fully settled or not bought at all.

use crate::markets::MarketReport;
use crate::models::agent::{Agent, AgentKind, Resource};
use crate::models::ledger::TransferReason;
use crate::models::state::{WorldState, GOVERNMENT_ID};
use crate::rng::RngManager;
use crate::settlement::{transfer_money, transfer_resource};
use tracing::debug;

pub fn resolve(state: &mut WorldState, rng: &mut RngManager) -> MarketReport {
    let mut firms = state.active_ids(AgentKind::Firm);
    rng.shuffle(&mut firms);
    let households = state.active_ids(AgentKind::Household);
    let tax_rate = state.config().params.sales_tax_rate.max(0.0);
    let mut report = MarketReport::default();

    for buyer in &households {
        let mut unmet = unmet_need(state, buyer);
        while unmet > 0 {
            let Some((seller, price)) = cheapest_stocked(state, &firms) else {
                break;
            };
            let tax = price * tax_rate;
            let cash = state.agent(buyer).map_or(0.0, Agent::cash);
            if !covers(cash, price, tax) {
                break;
            }
            if tax > 0.0 {
                if let Err(refusal) =
                    transfer_money(state, buyer, GOVERNMENT_ID, tax, TransferReason::SalesTax)
                {
                    debug!(buyer = buyer.as_str(), %refusal, "sales tax refused, purchase skipped");
                    break;
                }
            }
            if transfer_money(state, buyer, &seller, price, TransferReason::GoodsPurchase).is_err() {
                break;
            }
            if transfer_resource(state, &seller, buyer, Resource::ConsumerGoods, 1).is_err() {
                break;
            }
            if let Some(f) = state.agent_mut(&seller).and_then(Agent::as_firm_mut) {
                f.revenue_accumulator += price;
            }

            unmet -= 1;
            report.matches += 1;
            report.value += price;
        }
    }

    report
}

/// Whether `cash` settles the tax leg and then the price leg
///
/// Uses the guard's own subtraction, so a covered purchase can never be
/// refused halfway through.
fn covers(cash: f64, price: f64, tax: f64) -> bool {
    cash >= tax && cash - tax >= price
}

/// Need not covered by goods already held
fn unmet_need(state: &WorldState, id: &str) -> u64 {
    state.agent(id).map_or(0, |a| {
        let need = a.as_household().map_or(0, |h| h.need);
        need.saturating_sub(a.inventory().get(Resource::ConsumerGoods))
    })
}

/// First firm in `firms` order with the lowest price among those with stock
fn cheapest_stocked(state: &WorldState, firms: &[String]) -> Option<(String, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for id in firms {
        let Some(agent) = state.agent(id) else {
            continue;
        };
        if !agent.is_active() || agent.inventory().get(Resource::ConsumerGoods) == 0 {
            continue;
        }
        let Some(price) = agent.as_firm().map(|f| f.sales_price) else {
            continue;
        };
        if best.map_or(true, |(_, p)| price < p) {
            best = Some((id, price));
        }
    }
    best.map(|(id, price)| (id.to_string(), price))
}
