//! Simulation kernel
//!
//! Advances the world one discrete tick. `step` is pure over its input: it
//! clones the previous state, restores the generator from the state's
//! persisted position and returns a new state, so equal inputs always give
//! equal outputs and a failed step leaves the caller's state untouched.
//!
//! # Tick pipeline
//!
//! ```text
//! For each tick t:
//! 1. Restore generator, clone world, advance tick
//! 2. Maintenance institutions (bankruptcy, bond interest)
//! 3. Cognition against a snapshot, write-back, intent settlement
//! 4. Markets, in configured order
//! 5. Fiscal institutions (subsidy, taxes, then welfare)
//! 6. Invariant check + metrics snapshot
//! 7. Cleanup: close firm books, prune ledger, persist generator
//! ```
//!
//! # Example
//!
//! ```rust
//! use econ_sim_core::{ExperimentConfig, Simulation};
//!
//! let mut config = ExperimentConfig::default();
//! config.population.households = 10;
//! config.population.firms = 2;
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.run(5).unwrap();
//! assert_eq!(sim.state().tick(), 5);
//! assert_eq!(sim.metrics().count(), 5);
//! ```

use crate::behavior::{run_cognition, BehaviorKind};
use crate::core::init::initialize;
use crate::institutions::{run_phase, InstitutionKind, Phase};
use crate::markets::MarketMechanism;
use crate::metrics;
use crate::models::agent::AgentKind;
use crate::models::config::ExperimentConfig;
use crate::models::metrics::MetricsSnapshot;
use crate::models::state::WorldState;
use crate::rng::RngManager;
use crate::settlement::check_invariants;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Errors and diagnostics
// ============================================================================

/// Conditions that stop a run or refuse an input
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Money supply is not finite at tick {tick}: {value}")]
    NonFiniteMoneySupply { tick: u64, value: f64 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config mismatch: checkpoint hash {expected}, config hash {found}")]
    ConfigMismatch { expected: String, found: String },
}

/// Non-fatal findings reported with a step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "diagnostic", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A non-sovereign agent was below zero by more than the tolerance
    NegativeCash { agent: String, cash: f64 },
    /// A configured mechanism id is not registered; it was skipped
    UnknownMechanism { family: &'static str, id: String },
    /// A behavior was mapped to an agent type it cannot govern; it was skipped
    BehaviorKindMismatch { behavior: String, kind: AgentKind },
}

// ============================================================================
// Mechanism plan
// ============================================================================

/// Configuration ids resolved against the registries
#[derive(Debug, Clone, PartialEq)]
pub struct MechanismPlan {
    pub markets: Vec<MarketMechanism>,
    pub institutions: Vec<InstitutionKind>,
    pub behaviors: BTreeMap<AgentKind, BehaviorKind>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MechanismPlan {
    /// Look every configured id up; unknown or mismatched ids are skipped
    /// and reported
    pub fn resolve(config: &ExperimentConfig) -> Self {
        let mut diagnostics = Vec::new();

        let mut markets = Vec::new();
        for id in &config.markets {
            match MarketMechanism::lookup(id) {
                Some(market) => markets.push(market),
                None => diagnostics.push(Diagnostic::UnknownMechanism {
                    family: "market",
                    id: id.clone(),
                }),
            }
        }

        let mut institutions = Vec::new();
        for id in &config.institutions {
            match InstitutionKind::lookup(id) {
                Some(institution) => institutions.push(institution),
                None => diagnostics.push(Diagnostic::UnknownMechanism {
                    family: "institution",
                    id: id.clone(),
                }),
            }
        }

        let mut behaviors = BTreeMap::new();
        for (&kind, id) in &config.behaviors {
            match BehaviorKind::lookup(id) {
                Some(behavior) if behavior.governs() == kind => {
                    behaviors.insert(kind, behavior);
                }
                Some(_) => diagnostics.push(Diagnostic::BehaviorKindMismatch {
                    behavior: id.clone(),
                    kind,
                }),
                None => diagnostics.push(Diagnostic::UnknownMechanism {
                    family: "behavior",
                    id: id.clone(),
                }),
            }
        }

        for diagnostic in &diagnostics {
            warn!(?diagnostic, "configuration error, mechanism skipped");
        }

        Self {
            markets,
            institutions,
            behaviors,
            diagnostics,
        }
    }
}

// ============================================================================
// Step
// ============================================================================

/// Output of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub state: WorldState,
    pub diagnostics: Vec<Diagnostic>,
}

/// Advance `previous` by one tick
///
/// # Errors
///
/// `SimulationError::NonFiniteMoneySupply` if the invariant check finds the
/// money supply is NaN or infinite. The run must halt.
pub fn step(previous: &WorldState) -> Result<StepResult, SimulationError> {
    // STEP 1: RESTORE
    let mut rng = RngManager::from_state(previous.rng_state());
    let mut state = previous.clone();
    state.advance_tick();
    let tick = state.tick();

    let plan = MechanismPlan::resolve(state.config());
    let mut diagnostics = plan.diagnostics.clone();

    // STEP 2: MAINTENANCE
    let maintenance = run_phase(&mut state, &plan.institutions, Phase::Maintenance);
    debug!(tick, actions = maintenance, "maintenance institutions applied");

    // STEP 3: COGNITION
    let decisions = run_cognition(&mut state, &plan.behaviors, &mut rng);
    debug!(tick, decisions, "cognition complete");

    // STEP 4: MARKETS
    for market in &plan.markets {
        let report = market.resolve(&mut state, &mut rng);
        debug!(
            tick,
            market = market.id(),
            matches = report.matches,
            separations = report.separations,
            value = report.value,
            output = report.output,
            "market resolved"
        );
    }

    // STEP 5: FISCAL
    let fiscal = run_phase(&mut state, &plan.institutions, Phase::Fiscal);
    debug!(tick, actions = fiscal, "fiscal institutions applied");

    // STEP 6: METRICS
    let report = check_invariants(&state)?;
    diagnostics.extend(
        report
            .negative_cash
            .into_iter()
            .map(|(agent, cash)| Diagnostic::NegativeCash { agent, cash }),
    );
    let snapshot = metrics::snapshot(&state, report.money_supply);
    info!(
        tick,
        gdp = snapshot.gdp,
        cpi = snapshot.cpi,
        unemployment = snapshot.unemployment_rate,
        money_supply = snapshot.money_supply,
        active_firms = snapshot.active_firms,
        "tick complete"
    );
    state.push_metrics(snapshot);

    // STEP 7: CLEANUP
    close_firm_books(&mut state);
    state.ledger_mut().prune();
    state.set_rng_state(rng.get_state());

    Ok(StepResult { state, diagnostics })
}

/// Roll each active firm's tick revenue and expenses into its books
///
/// Expenses are everything the firm sent through the ledger this tick.
fn close_firm_books(state: &mut WorldState) {
    let tick = state.tick();
    let mut expenses: BTreeMap<String, f64> = BTreeMap::new();
    for entry in state.ledger().for_tick(tick) {
        *expenses.entry(entry.sender().to_string()).or_insert(0.0) += entry.amount();
    }

    for agent in state.agents_mut().values_mut() {
        if !agent.is_active() {
            continue;
        }
        let spent = expenses.get(agent.id()).copied().unwrap_or(0.0);
        if let Some(firm) = agent.as_firm_mut() {
            firm.last_revenue = firm.revenue_accumulator;
            firm.last_expenses = spent;
            firm.last_profit = firm.last_revenue - firm.last_expenses;
            firm.revenue_accumulator = 0.0;
        }
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// Owns a world and steps it forward
#[derive(Debug, Clone)]
pub struct Simulation {
    state: WorldState,
}

impl Simulation {
    /// Initialize a world from `config`
    pub fn new(config: ExperimentConfig) -> Result<Self, SimulationError> {
        Ok(Self {
            state: initialize(config)?,
        })
    }

    /// Resume from an existing state, e.g. a loaded checkpoint
    pub fn from_state(state: WorldState) -> Self {
        Self { state }
    }

    /// Execute one tick
    ///
    /// On error the state is left at the last completed tick.
    pub fn tick(&mut self) -> Result<Vec<Diagnostic>, SimulationError> {
        let StepResult { state, diagnostics } = step(&self.state)?;
        self.state = state;
        Ok(diagnostics)
    }

    /// Execute `ticks` ticks, collecting their diagnostics
    pub fn run(&mut self, ticks: u64) -> Result<Vec<Diagnostic>, SimulationError> {
        let mut diagnostics = Vec::new();
        for _ in 0..ticks {
            diagnostics.extend(self.tick()?);
        }
        Ok(diagnostics)
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn into_state(self) -> WorldState {
        self.state
    }

    /// Metrics history, oldest first
    pub fn metrics(&self) -> impl Iterator<Item = &MetricsSnapshot> {
        self.state.metrics()
    }

    pub fn latest_metrics(&self) -> Option<&MetricsSnapshot> {
        self.state.latest_metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::init::initialize_with_agents;
    use crate::models::agent::{Agent, Resource};
    use crate::models::ledger::TransferReason;

    #[test]
    fn test_plan_reports_unknown_and_mismatched_ids() {
        let config = ExperimentConfig::bare("plan", 1)
            .with_market("labor_random")
            .with_market("auction")
            .with_institution("ubi")
            .with_behavior(AgentKind::Household, "firm_adaptive");

        let plan = MechanismPlan::resolve(&config);
        assert_eq!(plan.markets, vec![MarketMechanism::LaborRandom]);
        assert!(plan.institutions.is_empty());
        assert!(plan.behaviors.is_empty());
        assert_eq!(plan.diagnostics.len(), 3);
        assert!(plan.diagnostics.contains(&Diagnostic::BehaviorKindMismatch {
            behavior: "firm_adaptive".to_string(),
            kind: AgentKind::Household,
        }));
    }

    #[test]
    fn test_step_does_not_touch_input() {
        let state = initialize(ExperimentConfig::default()).unwrap();
        let before = state.clone();
        let result = step(&state).unwrap();

        assert_eq!(state, before);
        assert_eq!(result.state.tick(), 1);
        assert_eq!(result.state.metrics().count(), 1);
    }

    #[test]
    fn test_firm_books_closed_each_tick() {
        let config = ExperimentConfig::bare("books", 1).with_market("goods_random");
        let agents = vec![
            Agent::firm("firm-001")
                .with_cash(1_000.0)
                .with_stock(Resource::ConsumerGoods, 5),
            Agent::household("hh-0001").with_cash(100.0),
        ];
        let state = initialize_with_agents(config, agents).unwrap();

        let next = step(&state).unwrap().state;
        let firm = next.agent("firm-001").unwrap().as_firm().unwrap();
        assert_eq!(firm.last_revenue, 10.0);
        assert_eq!(firm.last_expenses, 0.0);
        assert_eq!(firm.last_profit, 10.0);
        assert_eq!(firm.revenue_accumulator, 0.0);
        assert_eq!(
            next.ledger()
                .for_tick_with_reason(1, TransferReason::GoodsPurchase)
                .count(),
            1
        );
    }

    #[test]
    fn test_simulation_run_advances_ticks() {
        let mut config = ExperimentConfig::default();
        config.population.households = 8;
        config.population.firms = 2;

        let mut sim = Simulation::new(config).unwrap();
        sim.run(3).unwrap();
        assert_eq!(sim.state().tick(), 3);
        assert_eq!(sim.latest_metrics().map(|m| m.tick), Some(3));
    }
}
