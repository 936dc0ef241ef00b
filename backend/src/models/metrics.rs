//! Per-tick aggregate statistics

use serde::{Deserialize, Serialize};

/// One tick's macro read of the economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    /// Sum of goods-purchase values this tick
    pub gdp: f64,
    /// Mean goods price this tick; carried over from the previous tick when nothing traded
    pub cpi: f64,
    pub unemployment_rate: f64,
    /// Sum of all non-sovereign cash
    pub money_supply: f64,
    /// Goods trades this tick
    pub transaction_count: usize,
    pub average_wage: f64,
    pub active_firms: usize,
}
