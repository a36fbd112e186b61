//! Command implementations.
//!
//! Commands that only read the ledger take it as an argument, so the test
//! runner can execute them against a ledger it loaded itself.

pub mod check;
pub mod format;
pub mod register;
pub mod stats;
pub mod test;
