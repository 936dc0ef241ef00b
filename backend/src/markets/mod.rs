//! Market mechanisms
//!
//! A market resolves all trades of one good or factor for the tick: it both
//! matches buyers with sellers and settles every match through the
//! accounting guard, serially, so no unit can be sold twice.
//!
//! Mechanisms form a closed set looked up by a stable string id. The
//! configuration lists the ids to run, and that list is the execution order.

pub mod goods;
pub mod labor;

use crate::models::state::WorldState;
use crate::rng::RngManager;

/// Counts from one market resolution, for logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketReport {
    /// Hires (labor) or units sold (goods)
    pub matches: usize,
    /// Workers released (labor only)
    pub separations: usize,
    /// Money settled
    pub value: f64,
    /// Goods produced (labor only)
    pub output: u64,
}

/// Registered market mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketMechanism {
    /// Random-order matching of households to firms, then production
    LaborRandom,
    /// Households buy from the cheapest stocked firm
    GoodsRandom,
}

impl MarketMechanism {
    pub const ALL: [MarketMechanism; 2] = [MarketMechanism::LaborRandom, MarketMechanism::GoodsRandom];

    pub fn id(self) -> &'static str {
        match self {
            MarketMechanism::LaborRandom => "labor_random",
            MarketMechanism::GoodsRandom => "goods_random",
        }
    }

    /// Registry lookup by configuration id
    pub fn lookup(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    pub fn resolve(self, state: &mut WorldState, rng: &mut RngManager) -> MarketReport {
        match self {
            MarketMechanism::LaborRandom => labor::resolve(state, rng),
            MarketMechanism::GoodsRandom => goods::resolve(state, rng),
        }
    }
}
