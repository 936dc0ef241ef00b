//! Ledger of completed value transfers.
//!
//! Every successful money transfer appends exactly one [`LedgerEntry`].
//! Entries are immutable once written. The ledger is chronological and is
//! pruned from its oldest end during the kernel's cleanup phase so memory
//! stays bounded regardless of run length.
//!
//! # Example
//!
//! ```rust
//! use econ_sim_core::models::{Ledger, LedgerEntry, TransferReason};
//!
//! let mut ledger = Ledger::new(2);
//! for tick in 1..=3 {
//!     ledger.record(LedgerEntry::new(tick, "hh-0001", "firm-001", 10.0, TransferReason::GoodsPurchase));
//! }
//! ledger.prune();
//! assert_eq!(ledger.len(), 2);
//! assert_eq!(ledger.entries().next().unwrap().tick(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Closed vocabulary of transfer reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferReason {
    WagePayment,
    GoodsPurchase,
    IncomeTax,
    WealthTax,
    SalesTax,
    Subsidy,
    EmergencyWelfare,
    BankruptcyLiquidation,
    BondInterest,
    BondPurchase,
    BondRedemption,
}

/// One completed money transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    tick: u64,
    sender: String,
    receiver: String,
    amount: f64,
    reason: TransferReason,
}

impl LedgerEntry {
    pub fn new(
        tick: u64,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        reason: TransferReason,
    ) -> Self {
        Self {
            tick,
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            reason,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn reason(&self) -> TransferReason {
        self.reason
    }
}

/// Append-and-prune log of ledger entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    entries: VecDeque<LedgerEntry>,
    capacity: usize,
}

impl Ledger {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn record(&mut self, entry: LedgerEntry) {
        self.entries.push_back(entry);
    }

    /// Drop oldest entries until the ledger fits its capacity
    pub fn prune(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    /// Entries written during `tick`
    ///
    /// Entries are chronological, so the scan walks back from the newest
    /// entry and stops at the first older tick.
    pub fn for_tick(&self, tick: u64) -> impl Iterator<Item = &LedgerEntry> {
        let start = self
            .entries
            .iter()
            .rposition(|e| e.tick < tick)
            .map_or(0, |i| i + 1);
        self.entries.range(start..).filter(move |e| e.tick == tick)
    }

    /// Entries written during `tick` with the given reason
    pub fn for_tick_with_reason(
        &self,
        tick: u64,
        reason: TransferReason,
    ) -> impl Iterator<Item = &LedgerEntry> {
        self.for_tick(tick).filter(move |e| e.reason == reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tick: u64, amount: f64, reason: TransferReason) -> LedgerEntry {
        LedgerEntry::new(tick, "a", "b", amount, reason)
    }

    #[test]
    fn test_for_tick_returns_only_that_tick() {
        let mut ledger = Ledger::new(100);
        ledger.record(entry(1, 1.0, TransferReason::WagePayment));
        ledger.record(entry(2, 2.0, TransferReason::WagePayment));
        ledger.record(entry(2, 3.0, TransferReason::GoodsPurchase));

        let amounts: Vec<f64> = ledger.for_tick(2).map(|e| e.amount()).collect();
        assert_eq!(amounts, vec![2.0, 3.0]);

        let wages: Vec<f64> = ledger
            .for_tick_with_reason(2, TransferReason::WagePayment)
            .map(|e| e.amount())
            .collect();
        assert_eq!(wages, vec![2.0]);
        assert_eq!(ledger.for_tick(3).count(), 0);
    }

    #[test]
    fn test_prune_keeps_newest() {
        let mut ledger = Ledger::new(1);
        ledger.record(entry(1, 1.0, TransferReason::Subsidy));
        ledger.record(entry(2, 2.0, TransferReason::Subsidy));
        assert_eq!(ledger.len(), 2);

        ledger.prune();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries().next().map(|e| e.tick()), Some(2));
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&TransferReason::BankruptcyLiquidation).unwrap();
        assert_eq!(json, "\"bankruptcy_liquidation\"");
    }
}
