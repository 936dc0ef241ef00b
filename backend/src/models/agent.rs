//! Agent model
//!
//! One economic actor: a household, firm, bank, government or central bank.
//! Each agent has:
//! - Cash balance (f64, non-negative unless the agent is sovereign)
//! - Inventory of resources (non-negative unit counts)
//! - Beliefs and smoothed memory used by its behavior
//! - A role carrying the type-specific state
//!
//! CRITICAL: cash, inventory and bond holdings are crate-private. Outside the
//! settlement guard and the kernel phases they are read-only, which keeps the
//! ledger the only path for value transfer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Agent type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Household,
    Firm,
    Bank,
    Government,
    CentralBank,
}

impl AgentKind {
    /// Sovereign agents may transfer past zero (money creation/destruction)
    pub fn is_sovereign(self) -> bool {
        matches!(self, AgentKind::Government | AgentKind::CentralBank)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Household => "household",
            AgentKind::Firm => "firm",
            AgentKind::Bank => "bank",
            AgentKind::Government => "government",
            AgentKind::CentralBank => "central_bank",
        };
        f.write_str(name)
    }
}

/// Resource kinds an agent can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Labor,
    RawMaterials,
    ConsumerGoods,
    CapitalEquipment,
}

/// Per-resource holdings; absent entries mean zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    holdings: BTreeMap<Resource, u64>,
}

impl Inventory {
    pub fn get(&self, resource: Resource) -> u64 {
        self.holdings.get(&resource).copied().unwrap_or(0)
    }

    pub(crate) fn add(&mut self, resource: Resource, qty: u64) {
        if qty > 0 {
            *self.holdings.entry(resource).or_insert(0) += qty;
        }
    }

    /// Removes up to `qty` units and returns how many were removed
    pub(crate) fn remove(&mut self, resource: Resource, qty: u64) -> u64 {
        let held = self.get(resource);
        let taken = held.min(qty);
        if taken > 0 {
            self.holdings.insert(resource, held - taken);
        }
        taken
    }
}

/// What an agent believes about prices and its own asking wage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beliefs {
    pub prices: BTreeMap<Resource, f64>,
    /// Reservation wage for households, wage ask otherwise
    pub reservation_wage: f64,
}

impl Beliefs {
    pub fn price(&self, resource: Resource) -> f64 {
        self.prices.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn set_price(&mut self, resource: Resource, price: f64) {
        self.prices.insert(resource, price);
    }
}

/// Exponential moving averages of the agent's own performance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub profit_ema: f64,
    pub revenue_ema: f64,
    pub inventory_ema: f64,
    pub expenses_ema: f64,
}

/// Household-specific state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdState {
    pub utility: f64,
    /// Consumed / needed, last tick
    pub needs_satisfaction: f64,
    pub employed_at: Option<String>,
    pub starvation_streak: u32,
    pub skill: f64,
    /// Consumer goods needed per tick
    pub need: u64,
}

impl Default for HouseholdState {
    fn default() -> Self {
        Self {
            utility: 0.0,
            needs_satisfaction: 1.0,
            employed_at: None,
            starvation_streak: 0,
            skill: 1.0,
            need: 1,
        }
    }
}

/// Firm-specific state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmState {
    pub sales_price: f64,
    pub wage_offer: f64,
    /// Target headcount
    pub production_target: u32,
    pub insolvency_streak: u32,
    pub last_profit: f64,
    pub last_revenue: f64,
    pub last_expenses: f64,
    /// Goods revenue collected during the current tick
    pub revenue_accumulator: f64,
}

impl Default for FirmState {
    fn default() -> Self {
        Self {
            sales_price: 10.0,
            wage_offer: 10.0,
            production_target: 5,
            insolvency_streak: 0,
            last_profit: 0.0,
            last_revenue: 0.0,
            last_expenses: 0.0,
            revenue_accumulator: 0.0,
        }
    }
}

/// Type-specific state; the agent's kind is derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Household(HouseholdState),
    Firm(FirmState),
    Bank,
    Government,
    CentralBank,
}

impl Role {
    pub fn kind(&self) -> AgentKind {
        match self {
            Role::Household(_) => AgentKind::Household,
            Role::Firm(_) => AgentKind::Firm,
            Role::Bank => AgentKind::Bank,
            Role::Government => AgentKind::Government,
            Role::CentralBank => AgentKind::CentralBank,
        }
    }
}

/// One economic actor
///
/// # Example
/// ```
/// use econ_sim_core::{Agent, AgentKind, Resource};
///
/// let firm = Agent::firm("firm-001")
///     .with_cash(500.0)
///     .with_stock(Resource::ConsumerGoods, 10);
/// assert_eq!(firm.kind(), AgentKind::Firm);
/// assert_eq!(firm.cash(), 500.0);
/// assert_eq!(firm.inventory().get(Resource::ConsumerGoods), 10);
/// assert!(firm.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub(crate) id: String,
    pub(crate) cash: f64,
    pub(crate) inventory: Inventory,
    pub(crate) bonds: f64,
    pub(crate) active: bool,
    pub beliefs: Beliefs,
    pub memory: Memory,
    pub role: Role,
}

impl Agent {
    /// Create an agent with zero cash and an empty inventory
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            cash: 0.0,
            inventory: Inventory::default(),
            bonds: 0.0,
            active: true,
            beliefs: Beliefs::default(),
            memory: Memory::default(),
            role,
        }
    }

    pub fn household(id: impl Into<String>) -> Self {
        Self::new(id, Role::Household(HouseholdState::default()))
    }

    /// Firm with default state; its price belief mirrors the sales price
    pub fn firm(id: impl Into<String>) -> Self {
        let state = FirmState::default();
        let price = state.sales_price;
        let mut agent = Self::new(id, Role::Firm(state));
        agent.beliefs.set_price(Resource::ConsumerGoods, price);
        agent
    }

    pub fn bank(id: impl Into<String>) -> Self {
        Self::new(id, Role::Bank)
    }

    pub fn government(id: impl Into<String>) -> Self {
        Self::new(id, Role::Government)
    }

    pub fn central_bank(id: impl Into<String>) -> Self {
        Self::new(id, Role::CentralBank)
    }

    /// Set the opening cash balance
    pub fn with_cash(mut self, cash: f64) -> Self {
        self.cash = cash;
        self
    }

    /// Set the opening holding of one resource
    pub fn with_stock(mut self, resource: Resource, qty: u64) -> Self {
        self.inventory.holdings.insert(resource, qty);
        if resource == Resource::ConsumerGoods && self.kind() == AgentKind::Firm {
            self.memory.inventory_ema = qty as f64;
        }
        self
    }

    /// Stage a household as already employed by `firm_id`
    pub fn with_employer(mut self, firm_id: impl Into<String>) -> Self {
        if let Some(h) = self.as_household_mut() {
            h.employed_at = Some(firm_id.into());
        }
        self
    }

    /// Stage household state before the agent joins a world
    pub fn with_household_state(mut self, edit: impl FnOnce(&mut HouseholdState)) -> Self {
        if let Some(h) = self.as_household_mut() {
            edit(h);
        }
        self
    }

    /// Stage firm state before the agent joins a world
    ///
    /// ```
    /// use econ_sim_core::Agent;
    ///
    /// let firm = Agent::firm("firm-001").with_firm_state(|f| f.production_target = 1);
    /// assert_eq!(firm.as_firm().map(|f| f.production_target), Some(1));
    /// ```
    pub fn with_firm_state(mut self, edit: impl FnOnce(&mut FirmState)) -> Self {
        if let Some(f) = self.as_firm_mut() {
            edit(f);
        }
        self
    }

    /// Set opening bond holdings
    pub fn with_bonds(mut self, bonds: f64) -> Self {
        self.bonds = bonds.max(0.0);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.role.kind()
    }

    pub fn is_sovereign(&self) -> bool {
        self.kind().is_sovereign()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn bonds(&self) -> f64 {
        self.bonds
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check if agent can pay `amount` without overdrawing
    pub fn can_pay(&self, amount: f64) -> bool {
        self.is_sovereign() || self.cash >= amount
    }

    pub fn as_household(&self) -> Option<&HouseholdState> {
        match &self.role {
            Role::Household(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_household_mut(&mut self) -> Option<&mut HouseholdState> {
        match &mut self.role {
            Role::Household(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_firm(&self) -> Option<&FirmState> {
        match &self.role {
            Role::Firm(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_firm_mut(&mut self) -> Option<&mut FirmState> {
        match &mut self.role {
            Role::Firm(f) => Some(f),
            _ => None,
        }
    }

    /// Employer of a household, if any
    pub fn employer(&self) -> Option<&str> {
        self.as_household().and_then(|h| h.employed_at.as_deref())
    }

    pub(crate) fn debit(&mut self, amount: f64) {
        self.cash -= amount;
    }

    pub(crate) fn credit(&mut self, amount: f64) {
        self.cash += amount;
    }

    /// Permanent: nothing in the crate sets `active` back to true
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }
}
