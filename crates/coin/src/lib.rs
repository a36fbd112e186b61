//! Command-line interface for coin ledgers.
//!
//! A ledger is a directory of `*.coin` files (see [`coin_loader`]). The
//! `coin` binary loads it and runs one of the subcommands:
//!
//! - `register` (`reg`, `r`): postings, period totals or rollups of accounts
//! - `stats` (`s`): registry sizes, duplicate and unbalanced transactions
//! - `check`: all diagnostics, exit code 1 when the ledger has errors
//! - `format` (`fmt`, `f`): render transactions in canonical form
//! - `test` (`t`): run the test blocks embedded in a ledger file
//!
//! # Example Usage
//!
//! ```bash
//! coin --db ~/ledger register -r -m -t 3 expenses
//! coin stats -d
//! coin format -i 2018/october.coin
//! coin test tests/register.coin
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod cmd;
pub mod report;
