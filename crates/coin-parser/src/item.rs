//! Typed items produced by the parser.
//!
//! Items are unresolved: account names, commodity symbols and numbers are
//! still text. The resolver turns them into ledger entries.

use chrono::NaiveDate;
use coin_core::Tags;
use serde::Serialize;

/// A number with an optional commodity symbol, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAmount {
    /// Decimal literal including its sign, e.g. `-37.92`.
    pub number: String,
    /// Commodity symbol, leading or trailing in the source.
    pub commodity: Option<String>,
}

impl RawAmount {
    /// Create a raw amount.
    pub fn new(number: impl Into<String>, commodity: Option<&str>) -> Self {
        Self {
            number: number.into(),
            commodity: commodity.map(str::to_string),
        }
    }
}

/// `commodity SYMBOL` with its sub-lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommodityDecl {
    /// The declared symbol.
    pub symbol: String,
    /// Example amount from the `format` sub-line, giving the precision.
    pub format: Option<RawAmount>,
    /// Text of `note` sub-lines.
    pub note: String,
}

/// `account NAME` with its sub-lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDecl {
    /// Full account name.
    pub name: String,
    /// Default commodity from the `commodity` sub-line.
    pub commodity: Option<String>,
    /// Text of `note` sub-lines.
    pub note: String,
}

/// `P DATE COMMODITY AMOUNT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceDecl {
    /// Date of the rate.
    pub date: NaiveDate,
    /// The priced commodity.
    pub commodity: String,
    /// Value of one unit, with the currency symbol.
    pub value: RawAmount,
}

/// An indented posting line with its folded note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPosting {
    /// Account name as written.
    pub account: String,
    /// Quantity; `None` when elided.
    pub quantity: Option<RawAmount>,
    /// Balance assertion after `=`.
    pub balance: Option<RawAmount>,
    /// Folded note lines.
    pub note: String,
    /// Tags found in the note.
    pub tags: Tags,
    /// 1-based source line.
    pub line: usize,
}

/// A transaction header with its postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    /// Posting date, relative dates already applied.
    pub posted: NaiveDate,
    /// Text in parentheses after the date.
    pub code: String,
    /// Free text description; may be empty.
    pub description: String,
    /// Folded note lines.
    pub note: String,
    /// Tags found in the note.
    pub tags: Tags,
    /// Postings in source order.
    pub postings: Vec<RawPosting>,
}

/// A `test` block: a command and its expected output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestBlock {
    /// The command line after `test`.
    pub cmd: String,
    /// Expected output lines, each terminated by `\n`.
    pub expected: String,
}

/// One top-level entry of a ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Item {
    /// A commodity declaration.
    Commodity(CommodityDecl),
    /// An account declaration.
    Account(AccountDecl),
    /// A price.
    Price(PriceDecl),
    /// A transaction.
    Transaction(RawTransaction),
    /// An embedded test.
    Test(TestBlock),
}
