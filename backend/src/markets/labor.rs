//! Labor market with random matching
//!
//! Per firm, in id order:
//! 1. Fire the surplus above the production target (tail of the id-sorted staff list)
//! 2. Pay every retained worker; a worker whose wage cannot be paid is released
//! 3. Scan the shuffled household list once, hiring unemployed households whose
//!    reservation wage is within the offer, paying each on match
//!
//! Then every firm produces `floor(sum of staff skill × productivity)` goods.

use crate::markets::MarketReport;
use crate::models::agent::{Agent, AgentKind, Resource};
use crate::models::ledger::TransferReason;
use crate::models::state::WorldState;
use crate::rng::RngManager;
use crate::settlement::transfer_money;

pub fn resolve(state: &mut WorldState, rng: &mut RngManager) -> MarketReport {
    let mut households = state.active_ids(AgentKind::Household);
    rng.shuffle(&mut households);
    let firms = state.active_ids(AgentKind::Firm);
    let mut report = MarketReport::default();

    for firm_id in &firms {
        let Some((target, wage)) = state
            .agent(firm_id)
            .and_then(Agent::as_firm)
            .map(|f| (f.production_target as usize, f.wage_offer))
        else {
            continue;
        };

        let mut staff = state.employees_of(firm_id);
        if staff.len() > target {
            for worker in staff.split_off(target) {
                release(state, &worker);
                report.separations += 1;
            }
        }

        let mut retained = 0;
        for worker in staff {
            if pay_wage(state, firm_id, &worker, wage, &mut report) {
                retained += 1;
            } else {
                release(state, &worker);
                report.separations += 1;
            }
        }

        let mut need = target.saturating_sub(retained);
        for candidate in &households {
            if need == 0 {
                break;
            }
            let available = state.agent(candidate).is_some_and(|a| {
                a.is_active() && a.employer().is_none() && a.beliefs.reservation_wage <= wage
            });
            if !available {
                continue;
            }
            if !pay_wage(state, firm_id, candidate, wage, &mut report) {
                break;
            }
            if let Some(h) = state.agent_mut(candidate).and_then(Agent::as_household_mut) {
                h.employed_at = Some(firm_id.clone());
            }
            need -= 1;
            report.matches += 1;
        }
    }

    let productivity = state.config().tuning.productivity;
    for firm_id in &firms {
        let skill: f64 = state
            .employees_of(firm_id)
            .iter()
            .filter_map(|id| state.agent(id))
            .filter_map(Agent::as_household)
            .map(|h| h.skill)
            .sum();
        let output = (skill * productivity).floor() as u64;
        if let Some(firm) = state.agents_mut().get_mut(firm_id) {
            firm.inventory.add(Resource::ConsumerGoods, output);
        }
        report.output += output;
    }

    report
}

/// A zero wage offer employs without a transfer
fn pay_wage(
    state: &mut WorldState,
    firm_id: &str,
    worker: &str,
    wage: f64,
    report: &mut MarketReport,
) -> bool {
    if wage <= 0.0 {
        return true;
    }
    match transfer_money(state, firm_id, worker, wage, TransferReason::WagePayment) {
        Ok(_) => {
            report.value += wage;
            true
        }
        Err(_) => false,
    }
}

fn release(state: &mut WorldState, worker: &str) {
    if let Some(h) = state.agent_mut(worker).and_then(Agent::as_household_mut) {
        h.employed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExperimentConfig;

    fn household(id: &str, reservation: f64, skill: f64) -> Agent {
        let mut hh = Agent::household(id);
        hh.beliefs.reservation_wage = reservation;
        if let Some(h) = hh.as_household_mut() {
            h.skill = skill;
        }
        hh
    }

    fn firm(id: &str, cash: f64, target: u32, wage: f64) -> Agent {
        let mut firm = Agent::firm(id).with_cash(cash);
        if let Some(f) = firm.as_firm_mut() {
            f.production_target = target;
            f.wage_offer = wage;
        }
        firm
    }

    #[test]
    fn test_hires_up_to_target_and_pays_on_match() {
        let agents = vec![
            household("hh-1", 5.0, 1.0),
            household("hh-2", 5.0, 1.0),
            household("hh-3", 5.0, 1.0),
            firm("firm-1", 100.0, 2, 10.0),
        ];
        let mut state = WorldState::new(ExperimentConfig::bare("labor", 3), agents);
        let mut rng = RngManager::new(3);

        let report = resolve(&mut state, &mut rng);

        assert_eq!(report.matches, 2);
        assert_eq!(state.employees_of("firm-1").len(), 2);
        assert_eq!(state.agent("firm-1").unwrap().cash(), 80.0);
        assert_eq!(state.ledger().len(), 2);
        // 2 workers × skill 1.0 × productivity 2.0
        assert_eq!(
            state.agent("firm-1").unwrap().inventory().get(Resource::ConsumerGoods),
            4
        );
    }

    #[test]
    fn test_reservation_wage_above_offer_not_hired() {
        let agents = vec![household("hh-1", 12.0, 1.0), firm("firm-1", 100.0, 1, 10.0)];
        let mut state = WorldState::new(ExperimentConfig::bare("labor", 3), agents);
        let report = resolve(&mut state, &mut RngManager::new(3));

        assert_eq!(report.matches, 0);
        assert!(state.ledger().is_empty());
    }

    #[test]
    fn test_surplus_fired_from_tail_of_staff_list() {
        let mut agents = vec![firm("firm-1", 100.0, 1, 0.0)];
        for id in ["hh-1", "hh-2", "hh-3"] {
            let mut hh = household(id, 0.0, 1.0);
            hh.as_household_mut().unwrap().employed_at = Some("firm-1".to_string());
            agents.push(hh);
        }
        let mut state = WorldState::new(ExperimentConfig::bare("labor", 3), agents);
        let report = resolve(&mut state, &mut RngManager::new(3));

        assert_eq!(report.separations, 2);
        assert_eq!(state.employees_of("firm-1"), vec!["hh-1"]);
    }

    #[test]
    fn test_unpayable_wage_stops_hiring() {
        let agents = vec![
            household("hh-1", 1.0, 1.0),
            household("hh-2", 1.0, 1.0),
            firm("firm-1", 15.0, 2, 10.0),
        ];
        let mut state = WorldState::new(ExperimentConfig::bare("labor", 3), agents);
        let report = resolve(&mut state, &mut RngManager::new(9));

        assert_eq!(report.matches, 1);
        assert_eq!(state.agent("firm-1").unwrap().cash(), 5.0);
    }
}
