//! Resolver error types.

use coin_core::AmountError;
use thiserror::Error;

use crate::interpolate::InterpolationError;

/// An item that cannot be linked into the ledger.
///
/// A resolve error is fatal for the file being loaded; items resolved
/// before it stay in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A posting's commodity differs from its account's commodity.
    #[error("line {line}: {account} holds {expected}, cannot post {found}")]
    AccountCommodity {
        /// 1-based source line of the posting.
        line: usize,
        /// Full account name.
        account: String,
        /// The account's commodity.
        expected: String,
        /// The posting's commodity.
        found: String,
    },

    /// A number without a symbol on an account without a default commodity.
    #[error("line {line}: no commodity given and {account} has no default")]
    MissingCommodity {
        /// 1-based source line.
        line: usize,
        /// Full account name.
        account: String,
    },

    /// An amount literal could not be read, or arithmetic failed.
    #[error("line {line}: {source}")]
    Amount {
        /// 1-based source line.
        line: usize,
        /// The underlying amount error.
        #[source]
        source: AmountError,
    },

    /// An elided quantity could not be computed.
    #[error("line {line}: cannot infer elided amount: {source}")]
    Interpolation {
        /// 1-based source line of the transaction.
        line: usize,
        /// The underlying interpolation error.
        #[source]
        source: InterpolationError,
    },
}

impl ResolveError {
    /// 1-based line of the offending item or posting.
    pub const fn line(&self) -> usize {
        match self {
            Self::AccountCommodity { line, .. }
            | Self::MissingCommodity { line, .. }
            | Self::Amount { line, .. }
            | Self::Interpolation { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ResolveError::AccountCommodity {
            line: 4,
            account: "Assets:Bank".to_string(),
            expected: "CAD".to_string(),
            found: "USD".to_string(),
        };
        assert_eq!(err.to_string(), "line 4: Assets:Bank holds CAD, cannot post USD");
        assert_eq!(err.line(), 4);

        let err = ResolveError::Interpolation {
            line: 9,
            source: InterpolationError::NoPrice {
                from: "USD".to_string(),
                to: "CAD".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "line 9: cannot infer elided amount: no price to convert USD into CAD"
        );
    }
}
