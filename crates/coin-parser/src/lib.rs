//! Parser for coin ledger files.
//!
//! Ledger files are plain text made of top-level entries: commodity and
//! account declarations, prices, transactions and embedded tests. This crate
//! turns source text into a stream of [`Item`]s; it knows nothing about the
//! ledger they end up in, which is the resolver's job.
//!
//! Parsing stops at the first error. Relative dates (`+3d`, `-1m`) are
//! resolved against an explicit reference date.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use coin_parser::{parse, Item};
//!
//! let source = "\
//! commodity CAD
//!   format 1.00 CAD
//!
//! 2008/04/02 COSTCO WHOLESALE
//!   Expenses:Groceries  37.92 CAD
//!   Liabilities:Credit:AMEX
//! ";
//! let today = NaiveDate::from_ymd_opt(2008, 4, 2).unwrap();
//! let items = parse(source, today).unwrap();
//! assert_eq!(items.len(), 2);
//! assert!(matches!(items[1].value, Item::Transaction(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod date;
mod error;
mod item;
pub mod lexer;
mod parser;
mod span;

pub use error::{ParseError, ParseErrorKind};
pub use item::{
    AccountDecl, CommodityDecl, Item, PriceDecl, RawAmount, RawPosting, RawTransaction, TestBlock,
};
pub use parser::{parse, Parser};
pub use span::{Span, Spanned};
