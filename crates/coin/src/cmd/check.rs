//! The `check` command.

use anyhow::{Context, Result};
use coin_core::Ledger;
use coin_loader::LoadError;
use coin_validate::{validate, Diagnostic, Severity};
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

use crate::report;

/// Report failed assertions, unbalanced and duplicate transactions.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Print diagnostics as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,
}

/// JSON output structure for all diagnostics.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    /// Files that failed to load
    load_errors: Vec<String>,
    /// Problems found in the loaded ledger
    diagnostics: &'a [Diagnostic],
    /// Total error count
    error_count: usize,
    /// Total warning count
    warning_count: usize,
}

/// Report `load_errors` and the diagnostics of `ledger`.
///
/// Exits with 1 when there is any error; warnings alone pass.
pub fn report(
    args: &Args,
    ledger: &Ledger,
    load_errors: &[LoadError],
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let diagnostics = validate(ledger);
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    let error_count = load_errors.len() + diagnostics.len() - warning_count;

    if args.json {
        let output = JsonOutput {
            load_errors: load_errors.iter().map(ToString::to_string).collect(),
            diagnostics: &diagnostics,
            error_count,
            warning_count,
        };
        serde_json::to_writer_pretty(&mut *out, &output).context("failed to write JSON")?;
        writeln!(out)?;
    } else if !args.quiet {
        for error in load_errors {
            writeln!(out, "error: {error}")?;
        }
        for diagnostic in &diagnostics {
            writeln!(out, "{diagnostic}")?;
            if let Some(context) = &diagnostic.context {
                writeln!(out, "  {context}")?;
            }
        }
        report::write_summary(out, error_count, warning_count)?;
    }

    Ok(if error_count > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
