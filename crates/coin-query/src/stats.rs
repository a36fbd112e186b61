//! Ledger statistics.

use coin_core::Ledger;
use serde::Serialize;
use std::fmt;

/// Sizes of the ledger registries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Known commodities.
    pub commodities: usize,
    /// Recorded prices.
    pub prices: usize,
    /// Accounts, including `Unbalanced` but not the root.
    pub accounts: usize,
    /// Transactions in the journal.
    pub transactions: usize,
}

impl Stats {
    /// Count the registries of `ledger`.
    pub fn of(ledger: &Ledger) -> Self {
        Self {
            commodities: ledger.commodities.len(),
            prices: ledger.prices.len(),
            accounts: ledger.accounts.len(),
            transactions: ledger.transaction_count(),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Commodities: {}", self.commodities)?;
        writeln!(f, "Prices: {}", self.prices)?;
        writeln!(f, "Accounts: {}", self.accounts)?;
        writeln!(f, "Transactions: {}", self.transactions)
    }
}
