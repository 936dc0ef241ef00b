//! Institutions
//!
//! System-wide rules applied with full visibility over the world. They have
//! no agent-local intent: each one scans the state and enforces its rule
//! through the accounting guard.
//!
//! Institutions belong to one of two phases. Maintenance runs before
//! cognition (a firm that failed last tick never reaches the markets),
//! fiscal runs after the markets (taxes see this tick's realized income).
//! Within a phase they always run in [`InstitutionKind::ALL`] order,
//! whatever order the configuration lists them in. Welfare comes last in
//! the fiscal phase so taxes cannot leave a household below the floor.

pub mod bankruptcy;
pub mod bonds;
pub mod fiscal;

use crate::models::state::{WorldState, GOVERNMENT_ID};

/// Where in the tick an institution runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Maintenance,
    Fiscal,
}

/// Registered institutions, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstitutionKind {
    BankruptcyStandard,
    BankruptcyForgiving,
    BondYield,
    FirmSubsidy,
    IncomeTaxFlat,
    WealthTax,
    EmergencyWelfare,
}

impl InstitutionKind {
    pub const ALL: [InstitutionKind; 7] = [
        InstitutionKind::BankruptcyStandard,
        InstitutionKind::BankruptcyForgiving,
        InstitutionKind::BondYield,
        InstitutionKind::FirmSubsidy,
        InstitutionKind::IncomeTaxFlat,
        InstitutionKind::WealthTax,
        InstitutionKind::EmergencyWelfare,
    ];

    pub fn id(self) -> &'static str {
        match self {
            InstitutionKind::BankruptcyStandard => "bankruptcy_standard",
            InstitutionKind::BankruptcyForgiving => "bankruptcy_forgiving",
            InstitutionKind::BondYield => "bond_yield",
            InstitutionKind::EmergencyWelfare => "emergency_welfare",
            InstitutionKind::FirmSubsidy => "firm_subsidy",
            InstitutionKind::IncomeTaxFlat => "income_tax_flat",
            InstitutionKind::WealthTax => "wealth_tax",
        }
    }

    /// Registry lookup by configuration id
    pub fn lookup(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.id() == id)
    }

    pub fn phase(self) -> Phase {
        match self {
            InstitutionKind::BankruptcyStandard
            | InstitutionKind::BankruptcyForgiving
            | InstitutionKind::BondYield => Phase::Maintenance,
            InstitutionKind::EmergencyWelfare
            | InstitutionKind::FirmSubsidy
            | InstitutionKind::IncomeTaxFlat
            | InstitutionKind::WealthTax => Phase::Fiscal,
        }
    }

    /// Apply the rule once; returns the number of transfers or liquidations
    pub fn apply(self, state: &mut WorldState) -> usize {
        let tuning = &state.config().tuning;
        let (standard, forgiving) = (
            tuning.bankruptcy_streak_standard,
            tuning.bankruptcy_streak_forgiving,
        );
        match self {
            InstitutionKind::BankruptcyStandard => bankruptcy::liquidate_insolvent(state, standard),
            InstitutionKind::BankruptcyForgiving => {
                bankruptcy::liquidate_insolvent(state, forgiving)
            }
            InstitutionKind::BondYield => bonds::pay_interest(state),
            InstitutionKind::EmergencyWelfare => fiscal::emergency_welfare(state),
            InstitutionKind::FirmSubsidy => fiscal::firm_subsidy(state),
            InstitutionKind::IncomeTaxFlat => fiscal::income_tax(state),
            InstitutionKind::WealthTax => fiscal::wealth_tax(state),
        }
    }
}

/// Run every planned institution of `phase` in canonical order
pub fn run_phase(state: &mut WorldState, planned: &[InstitutionKind], phase: Phase) -> usize {
    let mut ordered: Vec<InstitutionKind> = planned
        .iter()
        .copied()
        .filter(|i| i.phase() == phase)
        .collect();
    ordered.sort();
    ordered.dedup();

    ordered.into_iter().map(|i| i.apply(state)).sum()
}

/// Treasury funding gate
///
/// With money printing on, government creates money freely. Otherwise a
/// government-funded payout happens only when government cash covers it.
pub(crate) fn treasury_can_fund(state: &WorldState, amount: f64) -> bool {
    if state.config().params.money_printing {
        return true;
    }
    state
        .agent(GOVERNMENT_ID)
        .is_some_and(|gov| gov.cash() >= amount)
}
