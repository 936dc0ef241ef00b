//! Adaptive household behavior
//!
//! Per tick: refresh the price belief from the last CPI, update skill,
//! eat from own stock, score utility, adapt the reservation wage, then
//! rebalance savings between cash and government bonds.

use crate::behavior::{ema, Intent};
use crate::models::agent::{Agent, Resource, Role};
use crate::models::state::WorldState;
use crate::rng::RngManager;

/// Institution id whose presence opens the bond market to savers
const BOND_MARKET: &str = "bond_yield";

pub fn decide(agent: &mut Agent, world: &WorldState, rng: &mut RngManager) -> Vec<Intent> {
    let tuning = &world.config().tuning;
    let Agent {
        role,
        inventory,
        beliefs,
        cash,
        bonds,
        ..
    } = agent;
    let Role::Household(hh) = role else {
        return Vec::new();
    };

    if let Some(cpi) = world.latest_metrics().map(|m| m.cpi).filter(|p| *p > 0.0) {
        let belief = ema(tuning.ema_alpha, cpi, beliefs.price(Resource::ConsumerGoods));
        beliefs.set_price(Resource::ConsumerGoods, belief);
    }

    let employed = hh.employed_at.is_some();
    hh.skill = if employed {
        (hh.skill + tuning.skill_gain).min(tuning.skill_max)
    } else {
        (hh.skill - tuning.skill_decay).max(tuning.skill_min)
    };

    let eaten = inventory.remove(Resource::ConsumerGoods, hh.need);
    if eaten < hh.need {
        hh.starvation_streak += 1;
    } else {
        hh.starvation_streak = 0;
    }
    hh.needs_satisfaction = if hh.need == 0 {
        1.0
    } else {
        eaten as f64 / hh.need as f64
    };

    let leisure = if employed { 0.0 } else { tuning.leisure_bonus };
    hh.utility = (1.0 + eaten as f64).ln() + leisure;

    if !employed {
        let decay = if hh.starvation_streak >= tuning.panic_streak {
            tuning.panic_decay
        } else {
            tuning.reservation_decay
        };
        beliefs.reservation_wage =
            (beliefs.reservation_wage * decay).max(tuning.min_reservation_wage);
    } else if hh.utility > tuning.raise_utility_threshold && rng.chance(tuning.raise_probability) {
        beliefs.reservation_wage *= tuning.raise_factor;
    }

    if !world.config().has_institution(BOND_MARKET) {
        return Vec::new();
    }
    let cost_of_living = hh.need as f64 * beliefs.price(Resource::ConsumerGoods);
    if cost_of_living <= 0.0 {
        return Vec::new();
    }
    let buffer = tuning.savings_buffer_multiple * cost_of_living;
    if *cash > buffer {
        vec![Intent::BuyBonds {
            amount: *cash - buffer,
        }]
    } else if *cash < buffer && *bonds > 0.0 {
        vec![Intent::RedeemBonds {
            amount: (buffer - *cash).min(*bonds),
        }]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExperimentConfig;

    fn world(config: ExperimentConfig) -> WorldState {
        WorldState::new(config, vec![])
    }

    fn household(cash: f64, reservation: f64) -> Agent {
        let mut hh = Agent::household("hh").with_cash(cash);
        hh.beliefs.reservation_wage = reservation;
        hh.beliefs.set_price(Resource::ConsumerGoods, 10.0);
        hh
    }

    #[test]
    fn test_eats_from_stock_and_resets_streak() {
        let world = world(ExperimentConfig::bare("hh", 1));
        let mut hh = household(0.0, 5.0).with_stock(Resource::ConsumerGoods, 3);
        hh.as_household_mut().unwrap().starvation_streak = 2;

        decide(&mut hh, &world, &mut RngManager::new(1));

        let state = hh.as_household().unwrap();
        assert_eq!(hh.inventory().get(Resource::ConsumerGoods), 2);
        assert_eq!(state.starvation_streak, 0);
        assert_eq!(state.needs_satisfaction, 1.0);
        // ln(2) + leisure while unemployed
        assert!((state.utility - (2f64.ln() + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_unemployed_wage_decays_then_panics() {
        let world = world(ExperimentConfig::bare("hh", 1));
        let mut hh = household(0.0, 10.0);

        decide(&mut hh, &world, &mut RngManager::new(1));
        assert!((hh.beliefs.reservation_wage - 9.5).abs() < 1e-12);
        assert_eq!(hh.as_household().unwrap().starvation_streak, 1);

        hh.as_household_mut().unwrap().starvation_streak = 2;
        decide(&mut hh, &world, &mut RngManager::new(1));
        // streak reaches 3: panic decay
        assert!((hh.beliefs.reservation_wage - 9.5 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_reservation_wage_floor() {
        let world = world(ExperimentConfig::bare("hh", 1));
        let mut hh = household(0.0, 1.0);
        decide(&mut hh, &world, &mut RngManager::new(1));
        assert_eq!(hh.beliefs.reservation_wage, 1.0);
    }

    #[test]
    fn test_skill_bounded() {
        let world = world(ExperimentConfig::bare("hh", 1));
        let mut hh = household(0.0, 5.0);
        hh.as_household_mut().unwrap().skill = 0.5;
        decide(&mut hh, &world, &mut RngManager::new(1));
        assert_eq!(hh.as_household().unwrap().skill, 0.5);

        hh.as_household_mut().unwrap().skill = 2.0;
        hh.as_household_mut().unwrap().employed_at = Some("firm".to_string());
        decide(&mut hh, &world, &mut RngManager::new(1));
        assert_eq!(hh.as_household().unwrap().skill, 2.0);
    }

    #[test]
    fn test_savings_only_with_bond_market() {
        let mut hh = household(100.0, 5.0);
        let without = world(ExperimentConfig::bare("hh", 1));
        assert!(decide(&mut hh, &without, &mut RngManager::new(1)).is_empty());

        let with = world(ExperimentConfig::bare("hh", 1).with_institution("bond_yield"));
        let intents = decide(&mut hh, &with, &mut RngManager::new(1));
        // buffer = 3 × (1 unit × 10.0)
        assert_eq!(intents, vec![Intent::BuyBonds { amount: 70.0 }]);
    }

    #[test]
    fn test_redeems_when_below_buffer() {
        let with = world(ExperimentConfig::bare("hh", 1).with_institution("bond_yield"));
        let mut hh = household(10.0, 5.0).with_bonds(5.0);
        let intents = decide(&mut hh, &with, &mut RngManager::new(1));
        assert_eq!(intents, vec![Intent::RedeemBonds { amount: 5.0 }]);
    }
}
