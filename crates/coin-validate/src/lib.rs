//! Diagnostics for resolved coin ledgers.
//!
//! Resolution never stops on a failed balance assertion or an unbalanced
//! transaction; it records them and moves on. This crate turns those
//! records, and a scan for likely duplicate transactions, into
//! [`Diagnostic`]s.
//!
//! # Error Codes
//!
//! | Code | Description |
//! |------|-------------|
//! | E2001 | Balance assertion failed |
//! | E3001 | Transaction does not balance |
//! | E3005 | Possible duplicate transaction (warning) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::NaiveDate;
use coin_core::{Ledger, Location, ResolutionWarning, TransactionId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    /// E2001: Balance assertion failed.
    BalanceAssertionFailed,
    /// E3001: Transaction does not balance.
    TransactionUnbalanced,
    /// E3005: Transaction looks like a duplicate of an earlier one.
    DuplicateTransaction,
}

impl ErrorCode {
    /// Get the error code string (e.g., "E2001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BalanceAssertionFailed => "E2001",
            Self::TransactionUnbalanced => "E3001",
            Self::DuplicateTransaction => "E3005",
        }
    }

    /// Check if this is a warning (not an error).
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::DuplicateTransaction)
    }

    /// Get the severity level.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        if self.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// The ledger is wrong.
    Error,
    /// Suspicious but valid.
    Warning,
}

/// A problem found in a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{location}: [{code}] {message}")]
pub struct Diagnostic {
    /// Diagnostic code.
    pub code: ErrorCode,
    /// Severity of the code.
    pub severity: Severity,
    /// Human readable message.
    pub message: String,
    /// Where the offending transaction was read.
    pub location: Location,
    /// The offending transaction.
    pub transaction: TransactionId,
    /// Additional context.
    pub context: Option<String>,
    /// Another transaction involved, e.g. the one a duplicate repeats.
    pub related: Option<TransactionId>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        location: Location,
        transaction: TransactionId,
    ) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            location,
            transaction,
            context: None,
            related: None,
        }
    }

    /// Add context to this diagnostic.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Point at another transaction involved in the problem.
    #[must_use]
    pub fn with_related(mut self, related: TransactionId) -> Self {
        self.related = Some(related);
        self
    }
}

/// Balance assertions that disagreed with the running balance.
pub fn assertion_failures(ledger: &Ledger) -> Vec<Diagnostic> {
    ledger
        .warnings()
        .iter()
        .filter_map(|warning| match warning {
            ResolutionWarning::BalanceMismatch {
                location,
                transaction,
                account,
                expected,
                actual,
            } => Some(
                Diagnostic::new(
                    ErrorCode::BalanceAssertionFailed,
                    format!("balance assertion failed for {account}"),
                    location.clone(),
                    *transaction,
                )
                .with_context(format!("expected {expected}, found {actual}")),
            ),
            ResolutionWarning::Unbalanced { .. } => None,
        })
        .collect()
}

/// Journal transactions with a posting on the `Unbalanced` account.
pub fn find_unbalanced(ledger: &Ledger) -> Vec<Diagnostic> {
    let unbalanced = ledger.accounts.unbalanced();
    ledger
        .transactions()
        .flat_map(|(id, transaction)| {
            ledger
                .postings_of(id)
                .filter(move |(_, posting)| posting.account == unbalanced)
                .map(move |(_, posting)| {
                    Diagnostic::new(
                        ErrorCode::TransactionUnbalanced,
                        format!("transaction is unbalanced by {}", -&posting.quantity),
                        transaction.location.clone(),
                        id,
                    )
                    .with_context(transaction.description.clone())
                })
        })
        .collect()
}

/// Journal transactions that repeat an earlier transaction of the same day.
///
/// Two transactions are duplicates when they share the date, description
/// and postings (accounts and quantities, in order). Each duplicate is
/// reported once, against the first transaction it repeats.
pub fn find_duplicates(ledger: &Ledger) -> Vec<Diagnostic> {
    let mut days: BTreeMap<NaiveDate, Vec<TransactionId>> = BTreeMap::new();
    for (id, transaction) in ledger.transactions() {
        days.entry(transaction.posted).or_default().push(id);
    }
    let days: Vec<Vec<TransactionId>> = days.into_values().filter(|day| day.len() > 1).collect();

    days.par_iter()
        .flat_map_iter(|day| {
            day.iter().enumerate().filter_map(|(i, &id)| {
                let original = day[..i].iter().find(|&&earlier| ledger.is_duplicate(earlier, id))?;
                let transaction = ledger.transaction(id);
                let earlier = &ledger.transaction(*original).location;
                Some(
                    Diagnostic::new(
                        ErrorCode::DuplicateTransaction,
                        format!("possible duplicate of transaction at {earlier}"),
                        transaction.location.clone(),
                        id,
                    )
                    .with_context(transaction.description.clone())
                    .with_related(*original),
                )
            })
        })
        .collect()
}

/// Run every check, ordered by file and line.
pub fn validate(ledger: &Ledger) -> Vec<Diagnostic> {
    let mut diagnostics = assertion_failures(ledger);
    diagnostics.extend(find_unbalanced(ledger));
    diagnostics.extend(find_duplicates(ledger));
    diagnostics.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
    });
    diagnostics
}
