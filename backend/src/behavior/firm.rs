//! Adaptive firm behavior
//!
//! Smooths its own books, tracks an insolvency streak, reprices against the
//! smoothed inventory-to-expected-output ratio and moves its production
//! target (headcount) with the same signal.

use crate::behavior::{ema, Intent};
use crate::models::agent::{Agent, Resource, Role};
use crate::models::state::WorldState;
use crate::rng::RngManager;

pub fn decide(agent: &mut Agent, world: &WorldState, rng: &mut RngManager) -> Vec<Intent> {
    let tuning = &world.config().tuning;
    let Agent {
        role,
        inventory,
        beliefs,
        memory,
        cash,
        ..
    } = agent;
    let Role::Firm(firm) = role else {
        return Vec::new();
    };

    let stock = inventory.get(Resource::ConsumerGoods) as f64;
    let alpha = tuning.ema_alpha;
    memory.profit_ema = ema(alpha, firm.last_profit, memory.profit_ema);
    memory.revenue_ema = ema(alpha, firm.last_revenue, memory.revenue_ema);
    memory.expenses_ema = ema(alpha, firm.last_expenses, memory.expenses_ema);
    memory.inventory_ema = ema(alpha, stock, memory.inventory_ema);

    let distressed =
        *cash < tuning.firm_min_cash || memory.profit_ema < -tuning.firm_loss_tolerance;
    firm.insolvency_streak = if distressed {
        firm.insolvency_streak + 1
    } else {
        firm.insolvency_streak.saturating_sub(1)
    };

    let expected_output = (f64::from(firm.production_target) * tuning.productivity).max(1.0);
    let ratio = memory.inventory_ema / expected_output;

    if stock > tuning.fire_sale_multiple * expected_output {
        firm.sales_price *= tuning.fire_sale_factor;
    } else if ratio > tuning.glut_ratio {
        firm.sales_price *= tuning.price_down_factor;
    } else if ratio < tuning.shortage_ratio {
        firm.sales_price *= tuning.price_up_factor;
    }
    firm.sales_price = firm.sales_price.clamp(tuning.min_price, tuning.max_price);
    beliefs.set_price(Resource::ConsumerGoods, firm.sales_price);

    let next_headcount = firm.production_target.saturating_add(1);
    let next_headcount_cost = firm.wage_offer * f64::from(next_headcount);
    if ratio < tuning.shortage_ratio && *cash >= next_headcount_cost {
        firm.production_target = next_headcount;
    } else if ratio > tuning.glut_ratio {
        firm.production_target = firm.production_target.saturating_sub(1);
    }
    if rng.chance(tuning.target_noise_probability) {
        if rng.chance(0.5) {
            firm.production_target = firm.production_target.saturating_add(1);
        } else {
            firm.production_target = firm.production_target.saturating_sub(1);
        }
    }
    firm.production_target = firm
        .production_target
        .clamp(tuning.min_target, tuning.max_target);

    Vec::new()
}
