//! The `test` command: runs the test blocks embedded in a ledger file.
//!
//! A test block names a command line and the exact output it must print:
//!
//! ```text
//! test register -m expenses
//! Expenses CAD
//! 2018/10 |        37.92 |        37.92
//! end test
//! ```
//!
//! Each command is parsed like a `coin` command line and run against the
//! ledger loaded from that one file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use coin_core::Ledger;
use coin_loader::{Loader, LoaderConfig};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::cli::Cli;
use crate::report;

/// Run the test blocks of a ledger file.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// The ledger file holding the tests
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Output of one test command, errors included.
fn run_case(ledger: &Ledger, today: NaiveDate, cmd: &str) -> Vec<u8> {
    let mut buffer = Vec::new();
    match Cli::try_parse_from(std::iter::once("coin").chain(cmd.split_whitespace())) {
        Ok(cli) => {
            let today = cli.today.unwrap_or(today);
            if let Err(e) = cli.command.execute(ledger, today, &mut buffer) {
                buffer.extend_from_slice(format!("error: {e:#}\n").as_bytes());
            }
        }
        Err(e) => {
            buffer.extend_from_slice(e.to_string().as_bytes());
        }
    }
    buffer
}

/// Run the command.
pub fn run(args: &Args, config: &LoaderConfig, out: &mut dyn Write) -> Result<ExitCode> {
    let mut ledger = Ledger::new();
    Loader::from_config(config)
        .load_file(&mut ledger, &args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let mut failed = 0;
    for test in ledger.tests() {
        let actual = run_case(&ledger, config.reference_date, &test.cmd);
        if actual == test.expected.as_bytes() {
            writeln!(out, "OK {} {}", test.location, test.cmd)?;
            continue;
        }
        failed += 1;
        writeln!(out, "FAIL {} {}", test.location, test.cmd)?;
        report::write_diff(out, &test.expected, &String::from_utf8_lossy(&actual))?;
    }
    debug!(tests = ledger.tests().len(), failed, "ran tests");

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
