//! Core types for coin
//!
//! This crate provides the fundamental types used throughout the coin project:
//!
//! - [`Amount`] - An exact fixed-point quantity bound to a [`Commodity`]
//! - [`Commodities`] - The commodity registry
//! - [`Price`] / [`Prices`] - Exchange rates and the time-ordered price database
//! - [`Accounts`] - The account tree, addressed by [`AccountId`] handles
//! - [`Tags`] - Key/value annotations extracted from notes
//! - [`Transaction`] / [`Posting`] - Resolved ledger entries
//! - [`Ledger`] - The context object holding all registries
//!
//! # Example
//!
//! ```
//! use coin_core::{Amount, Ledger, Style};
//!
//! let mut ledger = Ledger::new();
//! let cad = ledger.commodities.declare("CAD", 2, "");
//!
//! let groceries = Amount::parse("37.92", cad.clone()).unwrap();
//! let refund = Amount::parse("-7.9", cad).unwrap();
//! let net = groceries.checked_add(&refund).unwrap();
//!
//! assert_eq!(net.to_string(), "30.02 CAD");
//! assert_eq!(net.render(Style::Ledger), "CAD 30.02");
//!
//! let expenses = ledger.accounts.get_or_create("Expenses:Groceries");
//! assert_eq!(ledger.accounts.get(expenses).name, "Groceries");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod amount;
pub mod commodity;
pub mod error;
pub mod format;
pub mod ledger;
pub mod price;
pub mod tags;
pub mod transaction;

pub use account::{Account, AccountId, Accounts, SEPARATOR, UNBALANCED};
pub use amount::{Amount, Style};
pub use commodity::{Commodities, Commodity, DEFAULT_DECIMALS};
pub use error::{AmountError, LookupError, ResolutionWarning};
pub use format::{format_price, format_transaction, DATE_FORMAT, MONTH_FORMAT, YEAR_FORMAT};
pub use ledger::{Ledger, NewPosting, TestCase};
pub use price::{Price, Prices};
pub use tags::{TagMatcher, Tags};
pub use transaction::{Location, Posting, PostingId, Transaction, TransactionId};
