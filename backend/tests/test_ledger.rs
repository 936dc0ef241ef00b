//! Ledger and accounting guard tests
//!
//! Exercises the guard through the public API: successful transfers write
//! exactly one entry, refusals change nothing, sovereigns may overdraw,
//! and the ledger is pruned to its capacity every tick.

use econ_sim_core::{
    initialize_with_agents, step, transfer_money, transfer_resource, Agent, ExperimentConfig,
    Resource, TransferReason, TransferRefusal, WorldState, GOVERNMENT_ID,
};

fn two_party_world() -> WorldState {
    let agents = vec![
        Agent::household("hh-0001").with_cash(100.0),
        Agent::firm("firm-001")
            .with_cash(50.0)
            .with_stock(Resource::ConsumerGoods, 3),
    ];
    initialize_with_agents(ExperimentConfig::bare("ledger", 1), agents).unwrap()
}

fn cash(state: &WorldState, id: &str) -> f64 {
    state.agent(id).map(|a| a.cash()).unwrap()
}

#[test]
fn test_successful_transfer_records_one_entry() {
    let mut state = two_party_world();

    let entry = transfer_money(
        &mut state,
        "hh-0001",
        "firm-001",
        25.0,
        TransferReason::GoodsPurchase,
    )
    .unwrap();

    assert_eq!(entry.sender(), "hh-0001");
    assert_eq!(entry.receiver(), "firm-001");
    assert_eq!(entry.amount(), 25.0);
    assert_eq!(entry.tick(), 0);
    assert_eq!(cash(&state, "hh-0001"), 75.0);
    assert_eq!(cash(&state, "firm-001"), 75.0);
    assert_eq!(state.ledger().len(), 1);
}

#[test]
fn test_refusals_leave_state_unchanged() {
    let mut state = two_party_world();
    let before = state.clone();

    let attempts = [
        ("hh-0001", "firm-001", 100.01),
        ("hh-0001", "firm-001", 0.0),
        ("hh-0001", "firm-001", -5.0),
        ("hh-0001", "firm-001", f64::NAN),
        ("hh-0001", "firm-001", f64::INFINITY),
        ("hh-0001", "hh-0001", 1.0),
        ("hh-0001", "nobody", 1.0),
        ("nobody", "hh-0001", 1.0),
    ];
    for (from, to, amount) in attempts {
        let result = transfer_money(&mut state, from, to, amount, TransferReason::GoodsPurchase);
        assert!(result.is_err(), "{} -> {} of {} should be refused", from, to, amount);
        assert_eq!(state, before);
    }
}

#[test]
fn test_insufficient_funds_reports_balance() {
    let mut state = two_party_world();
    let refusal = transfer_money(
        &mut state,
        "firm-001",
        "hh-0001",
        60.0,
        TransferReason::WagePayment,
    )
    .unwrap_err();

    assert_eq!(
        refusal,
        TransferRefusal::InsufficientFunds {
            required: 60.0,
            available: 50.0,
        }
    );
}

#[test]
fn test_exact_balance_can_be_spent() {
    let mut state = two_party_world();
    transfer_money(&mut state, "hh-0001", "firm-001", 100.0, TransferReason::GoodsPurchase)
        .unwrap();
    assert_eq!(cash(&state, "hh-0001"), 0.0);
}

#[test]
fn test_sovereign_may_overdraw() {
    let mut state = two_party_world();
    let government_cash = cash(&state, GOVERNMENT_ID);

    transfer_money(
        &mut state,
        GOVERNMENT_ID,
        "hh-0001",
        government_cash + 500.0,
        TransferReason::EmergencyWelfare,
    )
    .unwrap();
    assert_eq!(cash(&state, GOVERNMENT_ID), -500.0);
}

#[test]
fn test_resource_transfer_checks_stock() {
    let mut state = two_party_world();

    transfer_resource(&mut state, "firm-001", "hh-0001", Resource::ConsumerGoods, 2).unwrap();
    let refusal =
        transfer_resource(&mut state, "firm-001", "hh-0001", Resource::ConsumerGoods, 2)
            .unwrap_err();

    assert_eq!(
        refusal,
        TransferRefusal::InsufficientStock {
            resource: Resource::ConsumerGoods,
            required: 2,
            available: 1,
        }
    );
    let household = state.agent("hh-0001").unwrap();
    assert_eq!(household.inventory().get(Resource::ConsumerGoods), 2);
    assert!(state.ledger().is_empty(), "goods movements are not money entries");
}

#[test]
fn test_inactive_agents_cannot_transact() {
    let firm = Agent::firm("firm-001")
        .with_cash(10.0)
        .with_firm_state(|f| f.insolvency_streak = 3);
    let agents = vec![firm, Agent::household("hh-0001").with_cash(100.0)];
    let config = ExperimentConfig::bare("inactive", 1).with_institution("bankruptcy_standard");
    let state = initialize_with_agents(config, agents).unwrap();

    let mut state = step(&state).unwrap().state;
    assert!(!state.agent("firm-001").unwrap().is_active());

    let refusal = transfer_money(
        &mut state,
        "hh-0001",
        "firm-001",
        1.0,
        TransferReason::GoodsPurchase,
    )
    .unwrap_err();
    assert_eq!(refusal, TransferRefusal::InactiveAgent("firm-001".to_string()));
}

#[test]
fn test_ledger_pruned_to_capacity_each_tick() {
    let mut config = ExperimentConfig::default();
    config.population.households = 20;
    config.population.firms = 2;
    config.tuning.ledger_capacity = 8;

    let mut state = econ_sim_core::initialize(config).unwrap();
    for _ in 0..10 {
        state = step(&state).unwrap().state;
        assert!(state.ledger().len() <= 8);
    }
    assert_eq!(state.ledger().capacity(), 8);
}
