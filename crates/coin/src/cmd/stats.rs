//! The `stats` command.

use anyhow::{Context, Result};
use coin_core::{format_transaction, Ledger, Style, TransactionId};
use coin_query::Stats;
use coin_validate::{find_duplicates, find_unbalanced};
use std::io::Write;
use std::process::ExitCode;

/// Show ledger statistics, duplicate or unbalanced transactions.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Check for duplicate transactions
    #[arg(short = 'd', long)]
    pub duplicates: bool,

    /// Check for unbalanced transactions
    #[arg(short, long, conflicts_with = "duplicates")]
    pub unbalanced: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

fn write_transaction(out: &mut dyn Write, ledger: &Ledger, id: TransactionId) -> Result<()> {
    writeln!(out, "{}", ledger.transaction(id).location)?;
    write!(out, "{}", format_transaction(ledger, id, Style::Native))?;
    Ok(())
}

/// Run the command.
pub fn execute(args: &Args, ledger: &Ledger, out: &mut dyn Write) -> Result<ExitCode> {
    let diagnostics = if args.duplicates {
        find_duplicates(ledger)
    } else if args.unbalanced {
        find_unbalanced(ledger)
    } else {
        let stats = Stats::of(ledger);
        if args.json {
            serde_json::to_writer_pretty(&mut *out, &stats).context("failed to write JSON")?;
            writeln!(out)?;
        } else {
            write!(out, "{stats}")?;
        }
        return Ok(ExitCode::SUCCESS);
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &diagnostics).context("failed to write JSON")?;
        writeln!(out)?;
        return Ok(ExitCode::SUCCESS);
    }
    for diagnostic in &diagnostics {
        if args.duplicates {
            writeln!(out, "DUPLICATE TRANSACTION?")?;
            if let Some(original) = diagnostic.related {
                write_transaction(out, ledger, original)?;
            }
        } else {
            writeln!(out, "UNBALANCED TRANSACTION!")?;
        }
        write_transaction(out, ledger, diagnostic.transaction)?;
    }
    Ok(ExitCode::SUCCESS)
}
