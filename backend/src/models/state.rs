//! World State
//!
//! The entire universe at tick T: agents, ledger, metrics history, the
//! configuration of the run and the persisted generator state.
//!
//! # Critical Invariants
//!
//! 1. **Purity**: the state at T+1 depends only on the state at T
//! 2. **Unique IDs**: agent ids are map keys; iteration is in sorted id order
//! 3. **Immutable Config**: the configuration never changes after initialization
//! 4. **Retained History**: deactivated agents stay in the map

use crate::models::agent::{Agent, AgentKind};
use crate::models::config::ExperimentConfig;
use crate::models::ledger::Ledger;
use crate::models::metrics::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Id of the government agent created at initialization
pub const GOVERNMENT_ID: &str = "government";

/// Id of the central bank agent created at initialization
pub const CENTRAL_BANK_ID: &str = "central_bank";

/// Complete simulation state
///
/// Fields are private; only the kernel phases mutate them, through
/// crate-internal methods. Callers stage scenarios on `Agent` values before
/// handing them to `initialize_with_agents`; once inside a world an agent is
/// read-only from outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    tick: u64,
    agents: BTreeMap<String, Agent>,
    ledger: Ledger,
    metrics: VecDeque<MetricsSnapshot>,
    config: ExperimentConfig,
    rng_state: u32,
}

impl WorldState {
    /// Assemble a tick-0 state; validation lives in `core::init`
    pub(crate) fn new(config: ExperimentConfig, agents: Vec<Agent>) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| (agent.id().to_string(), agent))
            .collect();

        Self {
            tick: 0,
            agents,
            ledger: Ledger::new(config.tuning.ledger_capacity),
            metrics: VecDeque::new(),
            rng_state: config.seed,
            config,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn rng_state(&self) -> u32 {
        self.rng_state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Metrics history, oldest first
    pub fn metrics(&self) -> impl Iterator<Item = &MetricsSnapshot> {
        self.metrics.iter()
    }

    pub fn latest_metrics(&self) -> Option<&MetricsSnapshot> {
        self.metrics.back()
    }

    pub fn agents(&self) -> &BTreeMap<String, Agent> {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub(crate) fn agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Ids of active agents of one kind, in sorted order
    pub fn active_ids(&self, kind: AgentKind) -> Vec<String> {
        self.agents
            .values()
            .filter(|a| a.is_active() && a.kind() == kind)
            .map(|a| a.id().to_string())
            .collect()
    }

    /// Ids of active households employed by `firm_id`, in sorted order
    pub fn employees_of(&self, firm_id: &str) -> Vec<String> {
        self.agents
            .values()
            .filter(|a| a.is_active() && a.employer() == Some(firm_id))
            .map(|a| a.id().to_string())
            .collect()
    }

    /// Sum of cash over all non-sovereign agents
    pub fn money_supply(&self) -> f64 {
        self.agents
            .values()
            .filter(|a| !a.is_sovereign())
            .map(|a| a.cash())
            .sum()
    }

    pub(crate) fn agents_mut(&mut self) -> &mut BTreeMap<String, Agent> {
        &mut self.agents
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub(crate) fn set_rng_state(&mut self, state: u32) {
        self.rng_state = state;
    }

    /// Append a snapshot, dropping the oldest past the configured cap
    pub(crate) fn push_metrics(&mut self, snapshot: MetricsSnapshot) {
        self.metrics.push_back(snapshot);
        while self.metrics.len() > self.config.tuning.metrics_capacity {
            self.metrics.pop_front();
        }
    }
}
