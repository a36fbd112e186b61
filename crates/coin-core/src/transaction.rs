//! Resolved transactions and postings.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::account::AccountId;
use crate::amount::Amount;
use crate::tags::Tags;

/// Handle of a transaction in a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransactionId(pub(crate) usize);

impl TransactionId {
    /// Position of the transaction in the ledger's store.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle of a posting in a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PostingId(pub(crate) usize);

impl PostingId {
    /// Position of the posting in the ledger's store.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Where an entry was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// File name as given to the loader.
    pub file: Arc<str>,
    /// 1-based line number.
    pub line: usize,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<Arc<str>>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A dated group of postings that sum to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Posting date.
    pub posted: NaiveDate,
    /// Optional code written in parentheses after the date.
    pub code: String,
    /// Payee or description; may be empty.
    pub description: String,
    /// Verbatim note, lines joined with `\n`.
    pub note: String,
    /// Tags found in the note.
    pub tags: Tags,
    /// Postings in the order they were written.
    pub postings: Vec<PostingId>,
    /// Where the transaction header was read.
    pub location: Location,
}

impl Transaction {
    /// Create a transaction without postings.
    pub fn new(posted: NaiveDate, description: impl Into<String>, location: Location) -> Self {
        Self {
            posted,
            code: String::new(),
            description: description.into(),
            note: String::new(),
            tags: Tags::new(),
            postings: Vec::new(),
            location,
        }
    }

    /// The first posting other than `posting`, i.e. the other side of a
    /// simple two-legged transaction.
    pub fn other(&self, posting: PostingId) -> Option<PostingId> {
        self.postings.iter().copied().find(|&p| p != posting)
    }
}

/// One signed quantity applied to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// The owning transaction.
    pub transaction: TransactionId,
    /// The resolved account.
    pub account: AccountId,
    /// Signed quantity.
    pub quantity: Amount,
    /// Asserted balance of the account after this posting.
    pub balance: Option<Amount>,
    /// Verbatim note.
    pub note: String,
    /// Tags found in the note.
    pub tags: Tags,
}
