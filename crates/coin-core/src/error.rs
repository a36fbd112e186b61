//! Error and warning types shared by every stage of the engine.

use thiserror::Error;

use crate::amount::Amount;
use crate::transaction::{Location, TransactionId};

/// Failures of exact amount arithmetic.
///
/// `CommodityMismatch` is an internal contract violation: callers must
/// convert through a [`Price`](crate::Price) before mixing commodities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Two amounts of different commodities were combined.
    #[error("commodity mismatch: {left} vs {right}")]
    CommodityMismatch {
        /// Commodity of the left operand.
        left: String,
        /// Commodity of the right operand.
        right: String,
    },

    /// A literal has more fractional digits than its commodity allows.
    #[error("{text} has more than {decimals} decimal places allowed for {commodity}")]
    Precision {
        /// The offending literal.
        text: String,
        /// The commodity the literal was read for.
        commodity: String,
        /// Decimal places of that commodity.
        decimals: u32,
    },

    /// The text is not a decimal number.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// Division by zero.
    #[error("division by zero")]
    DivideByZero,
}

/// A query pattern that does not designate exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No account matches.
    #[error("no account matches {pattern:?}")]
    NotFound {
        /// The pattern that was looked up.
        pattern: String,
    },

    /// Several accounts match; all of them are listed.
    #[error("{pattern:?} is ambiguous, it matches: {}", candidates.join(", "))]
    Ambiguous {
        /// The pattern that was looked up.
        pattern: String,
        /// Full names of every matching account.
        candidates: Vec<String>,
    },

    /// A pattern segment is not a valid regular expression.
    #[error("invalid account pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The pattern that was looked up.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },
}

/// Non-fatal problems found while resolving a ledger.
///
/// Warnings are recorded on the [`Ledger`](crate::Ledger) and surface
/// through diagnostics; they never stop a load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionWarning {
    /// A balance assertion disagrees with the running balance.
    #[error("{location}: balance assertion failed for {account}: expected {expected}, found {actual}")]
    BalanceMismatch {
        /// Where the asserting transaction was read.
        location: Location,
        /// The asserting transaction.
        transaction: TransactionId,
        /// Full name of the account.
        account: String,
        /// The asserted balance.
        expected: Amount,
        /// The running balance after the posting.
        actual: Amount,
    },

    /// A transaction did not sum to zero and was balanced against
    /// the `Unbalanced` account.
    #[error("{location}: transaction is unbalanced by {residual}")]
    Unbalanced {
        /// Where the transaction was read.
        location: Location,
        /// The diverted transaction.
        transaction: TransactionId,
        /// The non-zero sum of the original postings.
        residual: Amount,
    },
}

impl ResolutionWarning {
    /// The location of the offending transaction.
    pub const fn location(&self) -> &Location {
        match self {
            Self::BalanceMismatch { location, .. } | Self::Unbalanced { location, .. } => location,
        }
    }

    /// The offending transaction.
    pub const fn transaction(&self) -> TransactionId {
        match self {
            Self::BalanceMismatch { transaction, .. } | Self::Unbalanced { transaction, .. } => {
                *transaction
            }
        }
    }
}
