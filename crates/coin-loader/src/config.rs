//! Loader configuration.

use chrono::NaiveDate;
use std::path::PathBuf;

/// File name of the commodity declarations, loaded first.
pub const COMMODITIES_FILE: &str = "commodities.coin";
/// File name of the account declarations, loaded second.
pub const ACCOUNTS_FILE: &str = "accounts.coin";
/// File name of the price database, loaded third.
pub const PRICES_FILE: &str = "prices.coin";
/// Extension of ledger files.
pub const EXTENSION: &str = "coin";

/// Where the ledger lives and which day relative dates are counted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// The ledger directory.
    pub db: PathBuf,
    /// Reference date for relative dates such as `+3d`.
    pub reference_date: NaiveDate,
}

impl LoaderConfig {
    /// Create a configuration.
    pub fn new(db: impl Into<PathBuf>, reference_date: NaiveDate) -> Self {
        Self {
            db: db.into(),
            reference_date,
        }
    }
}
