//! World initialization
//!
//! Builds the tick-0 world from an [`ExperimentConfig`]: the configured
//! population plus the two sovereign agents. Household skill and
//! reservation wages are jittered with the run's own generator, so the
//! opening population is part of the seed's deterministic sequence.

use crate::models::agent::{Agent, AgentKind, FirmState, Resource, Role};
use crate::models::config::ExperimentConfig;
use crate::models::state::{WorldState, CENTRAL_BANK_ID, GOVERNMENT_ID};
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;
use std::collections::BTreeSet;
use tracing::info;

/// Relative spread of the opening skill and reservation wage around their base
const OPENING_JITTER: f64 = 0.2;

/// Reject configurations the kernel cannot run
pub fn validate_config(config: &ExperimentConfig) -> Result<(), SimulationError> {
    let tuning = &config.tuning;
    let population = &config.population;

    if tuning.ledger_capacity == 0 {
        return Err(SimulationError::InvalidConfig(
            "ledger_capacity must be positive".to_string(),
        ));
    }
    if tuning.metrics_capacity == 0 {
        return Err(SimulationError::InvalidConfig(
            "metrics_capacity must be positive".to_string(),
        ));
    }
    if population.household_need == 0 {
        return Err(SimulationError::InvalidConfig(
            "household_need must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&tuning.ema_alpha) {
        return Err(SimulationError::InvalidConfig(format!(
            "ema_alpha must be in [0, 1], got {}",
            tuning.ema_alpha
        )));
    }
    if !(tuning.min_price > 0.0 && tuning.min_price <= tuning.max_price) {
        return Err(SimulationError::InvalidConfig(format!(
            "price bounds must satisfy 0 < min_price <= max_price, got [{}, {}]",
            tuning.min_price, tuning.max_price
        )));
    }
    if tuning.min_target > tuning.max_target {
        return Err(SimulationError::InvalidConfig(format!(
            "min_target {} exceeds max_target {}",
            tuning.min_target, tuning.max_target
        )));
    }
    if tuning.skill_min > tuning.skill_max {
        return Err(SimulationError::InvalidConfig(format!(
            "skill_min {} exceeds skill_max {}",
            tuning.skill_min, tuning.skill_max
        )));
    }
    if !(tuning.productivity.is_finite() && tuning.productivity >= 0.0) {
        return Err(SimulationError::InvalidConfig(format!(
            "productivity must be finite and non-negative, got {}",
            tuning.productivity
        )));
    }
    Ok(())
}

/// Build the configured population and return the tick-0 world
///
/// # Example
///
/// ```rust
/// use econ_sim_core::{initialize, AgentKind, ExperimentConfig};
///
/// let mut config = ExperimentConfig::default();
/// config.population.households = 3;
/// config.population.firms = 1;
/// config.population.banks = 0;
///
/// let world = initialize(config).unwrap();
/// assert_eq!(world.tick(), 0);
/// assert_eq!(world.active_ids(AgentKind::Household), vec!["hh-0001", "hh-0002", "hh-0003"]);
/// assert!(world.agent("government").is_some());
/// ```
pub fn initialize(config: ExperimentConfig) -> Result<WorldState, SimulationError> {
    validate_config(&config)?;

    let mut rng = RngManager::new(config.seed);
    let population = &config.population;
    let tuning = &config.tuning;
    let mut agents = Vec::with_capacity(population.households + population.firms + population.banks + 2);

    for i in 1..=population.households {
        let mut household = Agent::household(format!("hh-{:04}", i)).with_cash(population.household_cash);
        let skill = jitter(&mut rng, 1.0).clamp(tuning.skill_min, tuning.skill_max);
        let reservation = jitter(&mut rng, population.initial_wage).max(tuning.min_reservation_wage);
        if let Some(state) = household.as_household_mut() {
            state.skill = skill;
            state.need = population.household_need;
        }
        household.beliefs.reservation_wage = reservation;
        household
            .beliefs
            .set_price(Resource::ConsumerGoods, population.initial_price);
        agents.push(household);
    }

    for i in 1..=population.firms {
        let state = FirmState {
            sales_price: population.initial_price,
            wage_offer: population.initial_wage,
            production_target: population
                .initial_target
                .clamp(tuning.min_target, tuning.max_target),
            ..FirmState::default()
        };
        let mut firm = Agent::new(format!("firm-{:03}", i), Role::Firm(state))
            .with_cash(population.firm_cash)
            .with_stock(Resource::ConsumerGoods, population.initial_stock);
        firm.beliefs
            .set_price(Resource::ConsumerGoods, population.initial_price);
        agents.push(firm);
    }

    for i in 1..=population.banks {
        agents.push(Agent::bank(format!("bank-{:02}", i)).with_cash(population.bank_cash));
    }

    agents.push(Agent::government(GOVERNMENT_ID).with_cash(population.government_cash));
    agents.push(Agent::central_bank(CENTRAL_BANK_ID));

    let rng_state = rng.get_state();
    let mut world = WorldState::new(config, agents);
    world.set_rng_state(rng_state);

    info!(
        experiment = %world.config().id,
        seed = world.config().seed,
        agents = world.num_agents(),
        "world initialized"
    );
    Ok(world)
}

/// Tick-0 world from an explicit agent list
///
/// Missing sovereign agents are added. The generator starts at the seed.
///
/// # Errors
///
/// `SimulationError::InvalidConfig` for an invalid config, a duplicated
/// agent id, or a sovereign id held by an agent of the wrong type.
pub fn initialize_with_agents(
    config: ExperimentConfig,
    agents: Vec<Agent>,
) -> Result<WorldState, SimulationError> {
    validate_config(&config)?;

    let mut seen = BTreeSet::new();
    for agent in &agents {
        if !seen.insert(agent.id().to_string()) {
            return Err(SimulationError::InvalidConfig(format!(
                "duplicate agent id '{}'",
                agent.id()
            )));
        }
    }

    let mut agents = agents;
    for (id, kind) in [
        (GOVERNMENT_ID, AgentKind::Government),
        (CENTRAL_BANK_ID, AgentKind::CentralBank),
    ] {
        let existing = agents.iter().find(|a| a.id() == id).map(Agent::kind);
        match existing {
            Some(found) if found != kind => {
                return Err(SimulationError::InvalidConfig(format!(
                    "agent '{}' must be a {}, found {}",
                    id, kind, found
                )));
            }
            Some(_) => {}
            None if kind == AgentKind::Government => agents.push(
                Agent::government(GOVERNMENT_ID).with_cash(config.population.government_cash),
            ),
            None => agents.push(Agent::central_bank(CENTRAL_BANK_ID)),
        }
    }

    Ok(WorldState::new(config, agents))
}

/// `base` scaled by a uniform factor in [1 - jitter, 1 + jitter)
fn jitter(rng: &mut RngManager, base: f64) -> f64 {
    base * (1.0 - OPENING_JITTER + 2.0 * OPENING_JITTER * rng.next())
}
