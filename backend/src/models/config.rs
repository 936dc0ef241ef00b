//! Experiment configuration
//!
//! Everything that parameterizes a run: the seed, which mechanisms are
//! active, institutional parameters, the population to create, and the
//! model constants (`Tuning`). A configuration is immutable once a run has
//! been initialized from it.
//!
//! All structs deserialize with defaults, so a config file only needs the
//! fields it changes:
//!
//! ```rust
//! use econ_sim_core::ExperimentConfig;
//!
//! let config: ExperimentConfig = serde_json::from_str(r#"{
//!     "id": "austerity",
//!     "seed": 7,
//!     "params": { "income_tax_rate": 0.3 }
//! }"#).unwrap();
//!
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.markets, vec!["labor_random", "goods_random"]);
//! assert_eq!(config.params.income_tax_rate, 0.3);
//! ```

use crate::models::agent::AgentKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Complete, immutable configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub id: String,
    pub name: String,
    pub description: String,

    /// Seed for the deterministic generator
    pub seed: u32,

    /// Market mechanism ids, in execution order
    pub markets: Vec<String>,

    /// Institution ids; each runs in its phase's canonical order
    pub institutions: BTreeSet<String>,

    /// Behavior id governing each agent type
    pub behaviors: BTreeMap<AgentKind, String>,

    pub params: ExperimentParams,
    pub population: PopulationConfig,
    pub tuning: Tuning,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let behaviors = BTreeMap::from([
            (AgentKind::Household, "household_adaptive".to_string()),
            (AgentKind::Firm, "firm_adaptive".to_string()),
            (AgentKind::Bank, "bank_passive".to_string()),
        ]);
        let institutions = [
            "bankruptcy_standard",
            "bond_yield",
            "income_tax_flat",
            "emergency_welfare",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            id: "baseline".to_string(),
            name: "Baseline economy".to_string(),
            description: "Random-matching labor and goods markets with flat income tax"
                .to_string(),
            seed: 1337,
            markets: vec!["labor_random".to_string(), "goods_random".to_string()],
            institutions,
            behaviors,
            params: ExperimentParams::default(),
            population: PopulationConfig::default(),
            tuning: Tuning::default(),
        }
    }
}

impl ExperimentConfig {
    /// Configuration with no mechanisms at all; tests and custom worlds
    /// add exactly the mechanisms they exercise.
    pub fn bare(id: &str, seed: u32) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            seed,
            markets: Vec::new(),
            institutions: BTreeSet::new(),
            behaviors: BTreeMap::new(),
            ..Self::default()
        }
    }

    pub fn with_market(mut self, id: &str) -> Self {
        self.markets.push(id.to_string());
        self
    }

    pub fn with_institution(mut self, id: &str) -> Self {
        self.institutions.insert(id.to_string());
        self
    }

    pub fn with_behavior(mut self, kind: AgentKind, id: &str) -> Self {
        self.behaviors.insert(kind, id.to_string());
        self
    }

    pub fn has_institution(&self, id: &str) -> bool {
        self.institutions.contains(id)
    }
}

/// Institutional parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentParams {
    /// Flat tax on wage income
    pub income_tax_rate: f64,
    /// Tax on goods purchases, paid by the buyer on top of the price
    pub sales_tax_rate: f64,
    /// Share of a firm's wage bill refunded by government
    pub subsidy_rate: f64,
    /// When false, government payouts are limited to government cash
    pub money_printing: bool,
    /// Mechanism-specific parameters, keyed by name
    pub extensions: BTreeMap<String, f64>,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            income_tax_rate: 0.2,
            sales_tax_rate: 0.0,
            subsidy_rate: 0.0,
            money_printing: true,
            extensions: BTreeMap::new(),
        }
    }
}

impl ExperimentParams {
    /// Extension parameter or its default
    pub fn extension_or(&self, key: &str, default: f64) -> f64 {
        self.extensions.get(key).copied().unwrap_or(default)
    }
}

/// Population created by `initialize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub households: usize,
    pub firms: usize,
    pub banks: usize,
    pub household_cash: f64,
    pub firm_cash: f64,
    pub bank_cash: f64,
    pub government_cash: f64,
    /// Consumer goods each household needs per tick
    pub household_need: u64,
    pub initial_price: f64,
    pub initial_wage: f64,
    pub initial_stock: u64,
    pub initial_target: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            households: 50,
            firms: 5,
            banks: 1,
            household_cash: 100.0,
            firm_cash: 1_000.0,
            bank_cash: 5_000.0,
            government_cash: 10_000.0,
            household_need: 1,
            initial_price: 10.0,
            initial_wage: 10.0,
            initial_stock: 20,
            initial_target: 5,
        }
    }
}

/// Model constants threaded through every phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Weight of the newest observation in every moving average
    pub ema_alpha: f64,
    /// Goods produced per unit of employed skill
    pub productivity: f64,

    pub skill_min: f64,
    pub skill_max: f64,
    pub skill_gain: f64,
    pub skill_decay: f64,

    pub leisure_bonus: f64,
    pub reservation_decay: f64,
    pub panic_decay: f64,
    pub panic_streak: u32,
    pub min_reservation_wage: f64,
    pub raise_utility_threshold: f64,
    pub raise_probability: f64,
    pub raise_factor: f64,
    /// Savings buffer, in multiples of one tick's cost of living
    pub savings_buffer_multiple: f64,

    pub firm_min_cash: f64,
    pub firm_loss_tolerance: f64,
    pub fire_sale_multiple: f64,
    pub fire_sale_factor: f64,
    pub glut_ratio: f64,
    pub shortage_ratio: f64,
    pub price_down_factor: f64,
    pub price_up_factor: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub min_target: u32,
    pub max_target: u32,
    pub target_noise_probability: f64,

    pub bankruptcy_streak_standard: u32,
    pub bankruptcy_streak_forgiving: u32,

    pub ledger_capacity: usize,
    pub metrics_capacity: usize,
    pub negative_cash_tolerance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ema_alpha: 0.2,
            productivity: 2.0,
            skill_min: 0.5,
            skill_max: 2.0,
            skill_gain: 0.01,
            skill_decay: 0.005,
            leisure_bonus: 0.3,
            reservation_decay: 0.95,
            panic_decay: 0.8,
            panic_streak: 3,
            min_reservation_wage: 1.0,
            raise_utility_threshold: 0.6,
            raise_probability: 0.1,
            raise_factor: 1.05,
            savings_buffer_multiple: 3.0,
            firm_min_cash: 50.0,
            firm_loss_tolerance: 50.0,
            fire_sale_multiple: 3.0,
            fire_sale_factor: 0.85,
            glut_ratio: 1.2,
            shortage_ratio: 0.8,
            price_down_factor: 0.98,
            price_up_factor: 1.02,
            min_price: 0.5,
            max_price: 1_000_000.0,
            min_target: 1,
            max_target: 100,
            target_noise_probability: 0.05,
            bankruptcy_streak_standard: 3,
            bankruptcy_streak_forgiving: 10,
            ledger_capacity: 10_000,
            metrics_capacity: 1_000,
            negative_cash_tolerance: 1e-4,
        }
    }
}
