//! Agent behaviors (cognition phase)
//!
//! A behavior decides for one agent per tick. It reads an immutable snapshot
//! of the world and writes only the agent handed to it; it never moves money
//! itself. Transfers it wants (bond purchases and redemptions) come back as
//! [`Intent`]s, which the kernel settles through the accounting guard after
//! every agent has decided.
//!
//! Because decisions only touch their own agent, the order agents decide in
//! does not change the outcome, and the phase could run in parallel.

pub mod firm;
pub mod household;

use crate::institutions::treasury_can_fund;
use crate::models::agent::{Agent, AgentKind};
use crate::models::ledger::TransferReason;
use crate::models::state::{WorldState, GOVERNMENT_ID};
use crate::rng::RngManager;
use crate::settlement::transfer_money;
use std::collections::BTreeMap;
use tracing::debug;

/// A transfer a behavior asks the kernel to settle
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Move cash into government bonds
    BuyBonds { amount: f64 },
    /// Sell bonds back to government for cash
    RedeemBonds { amount: f64 },
}

/// Registered behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    HouseholdAdaptive,
    FirmAdaptive,
    /// Reserved extension point: decides nothing
    BankPassive,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 3] = [
        BehaviorKind::HouseholdAdaptive,
        BehaviorKind::FirmAdaptive,
        BehaviorKind::BankPassive,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BehaviorKind::HouseholdAdaptive => "household_adaptive",
            BehaviorKind::FirmAdaptive => "firm_adaptive",
            BehaviorKind::BankPassive => "bank_passive",
        }
    }

    /// Registry lookup by configuration id
    pub fn lookup(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    /// The agent type this behavior can govern
    pub fn governs(self) -> AgentKind {
        match self {
            BehaviorKind::HouseholdAdaptive => AgentKind::Household,
            BehaviorKind::FirmAdaptive => AgentKind::Firm,
            BehaviorKind::BankPassive => AgentKind::Bank,
        }
    }

    pub fn decide(self, agent: &mut Agent, world: &WorldState, rng: &mut RngManager) -> Vec<Intent> {
        match self {
            BehaviorKind::HouseholdAdaptive => household::decide(agent, world, rng),
            BehaviorKind::FirmAdaptive => firm::decide(agent, world, rng),
            BehaviorKind::BankPassive => Vec::new(),
        }
    }
}

/// Run one decision per active agent with a registered behavior
///
/// Decisions are computed against the state as it was when the phase
/// started, then written back, then their intents are settled in agent-id
/// order. Returns the number of decisions made.
pub fn run_cognition(
    state: &mut WorldState,
    plan: &BTreeMap<AgentKind, BehaviorKind>,
    rng: &mut RngManager,
) -> usize {
    let mut decided: Vec<(Agent, Vec<Intent>)> = Vec::new();
    for agent in state.agents().values() {
        if !agent.is_active() {
            continue;
        }
        let Some(behavior) = plan.get(&agent.kind()) else {
            continue;
        };
        let mut updated = agent.clone();
        let intents = behavior.decide(&mut updated, state, rng);
        decided.push((updated, intents));
    }

    let count = decided.len();
    let mut pending = Vec::new();
    for (agent, intents) in decided {
        let id = agent.id().to_string();
        state.agents_mut().insert(id.clone(), agent);
        pending.extend(intents.into_iter().map(|intent| (id.clone(), intent)));
    }

    for (id, intent) in pending {
        settle_intent(state, &id, intent);
    }

    count
}

fn settle_intent(state: &mut WorldState, id: &str, intent: Intent) {
    match intent {
        Intent::BuyBonds { amount } => {
            if transfer_money(state, id, GOVERNMENT_ID, amount, TransferReason::BondPurchase).is_ok() {
                if let Some(agent) = state.agent_mut(id) {
                    agent.bonds += amount;
                }
            }
        }
        Intent::RedeemBonds { amount } => {
            let held = state.agent(id).map_or(0.0, Agent::bonds);
            let amount = amount.min(held);
            if amount <= 0.0 || !treasury_can_fund(state, amount) {
                debug!(agent = id, amount, "bond redemption not funded");
                return;
            }
            if transfer_money(state, GOVERNMENT_ID, id, amount, TransferReason::BondRedemption).is_ok() {
                if let Some(agent) = state.agent_mut(id) {
                    agent.bonds = (agent.bonds - amount).max(0.0);
                }
            }
        }
    }
}

/// Exponential moving average step
pub(crate) fn ema(alpha: f64, observation: f64, previous: f64) -> f64 {
    alpha * observation + (1.0 - alpha) * previous
}
