//! Queries over resolved coin ledgers.
//!
//! Queries take a shared [`coin_core::Ledger`] and never modify it, so any
//! number of them can run concurrently once loading is done.
//!
//! - [`register`] - postings of one account, flat, bucketed by
//!   [`Interval`], over a whole subtree, or rolled up into the top
//!   sub-accounts
//! - [`Stats`] - sizes of the ledger registries
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use coin_core::Ledger;
//! use coin_query::{register, Interval, RegisterOptions, Report};
//!
//! let text = "\
//! 2018/10/01 groceries
//!   Expenses:Food:Groceries 30.00 CAD
//!   Assets:Bank
//!
//! 2018/10/02 restaurant
//!   Expenses:Food:Dining 20.00 CAD
//!   Assets:Bank
//! ";
//! let today = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
//! let mut ledger = Ledger::new();
//! let items = coin_parser::parse(text, today).unwrap();
//! coin_resolver::resolve(&mut ledger, "inline.coin", items).unwrap();
//!
//! let options = RegisterOptions {
//!     recurse: true,
//!     interval: Some(Interval::Month),
//!     ..RegisterOptions::default()
//! };
//! let register = register(&ledger, "expenses", &options).unwrap();
//! let Report::Rollup(rollup) = register.report else { panic!() };
//! let labels: Vec<&str> = rollup.rows.iter().map(|r| r.label.as_str()).collect();
//! assert_eq!(labels, ["Food", "Totals"]);
//! assert_eq!(rollup.rows[1].values[0].to_string(), "50.00 CAD");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod interval;
pub mod register;
pub mod rollup;
pub mod stats;
pub mod totals;

pub use error::QueryError;
pub use interval::Interval;
pub use register::{
    register, register_account, BucketRow, PostingRow, RecursiveRow, Register, RegisterOptions,
    Report, DEFAULT_TOP,
};
pub use rollup::{rollup, shorten_account_name, Rollup, RollupRow, RowKind, OTHER, TOTALS};
pub use stats::Stats;
pub use totals::Totals;
