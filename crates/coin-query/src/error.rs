//! Query error types.

use coin_core::{AmountError, LookupError};
use thiserror::Error;

/// Error returned when a query cannot be answered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The account pattern matched nothing, or more than one account.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Totals of different commodities met in one row.
    #[error("cannot aggregate: {0}")]
    Amount(#[from] AmountError),
}
