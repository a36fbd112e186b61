//! Resolution of parsed coin items into a ledger.
//!
//! This crate provides:
//! - Account linking, creating accounts and their ancestors on first use
//! - Default commodities for accounts and bare numbers
//! - Interpolation of a single elided posting quantity
//! - Multi-currency balancing through the price database
//! - Balance assertion checks against running balances
//!
//! # Balancing
//!
//! A transaction whose quantities do not sum to zero is kept, with an extra
//! posting to the `Unbalanced` account carrying the difference, and a
//! [`ResolutionWarning`](coin_core::ResolutionWarning) is recorded.
//!
//! ```
//! use chrono::NaiveDate;
//! use coin_core::Ledger;
//!
//! let source = "2018/10/01 groceries\n  Expenses:Food  10.00 CAD\n  Assets:Cash  -9.00 CAD\n";
//! let today = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
//! let items = coin_parser::parse(source, today).unwrap();
//!
//! let mut ledger = Ledger::new();
//! coin_resolver::resolve(&mut ledger, "example.coin", items).unwrap();
//! assert_eq!(ledger.warnings().len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod interpolate;
mod resolve;

pub use error::ResolveError;
pub use interpolate::{interpolate, majority, residual, InterpolationError};
pub use resolve::{resolve, Resolver};
