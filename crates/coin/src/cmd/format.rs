//! The `format` command.

use anyhow::{Context, Result};
use coin_core::{format_transaction, Ledger, Style, TransactionId};
use coin_loader::{Loader, LoaderConfig, ACCOUNTS_FILE, COMMODITIES_FILE, PRICES_FILE};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::NamedTempFile;
use tracing::debug;

/// Render the transactions of ledger files in canonical form.
///
/// Declarations of the ledger directory are loaded first so that bare
/// amounts and elided postings resolve as they do in a full load. Only
/// transactions are written out.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// The ledger file(s) to format
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Use ledger compatible format
    #[arg(long)]
    pub ledger: bool,

    /// Format file(s) in place
    #[arg(short, long)]
    pub in_place: bool,

    /// Trim excessive whitespace in descriptions and notes
    #[arg(short, long)]
    pub trim: bool,
}

/// Collapse whitespace runs to single spaces, line by line.
fn trim_whitespace(text: &str) -> String {
    text.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the journal, each transaction followed by a blank line.
fn render(ledger: &mut Ledger, args: &Args) -> String {
    let ids: Vec<TransactionId> = ledger.transactions().map(|(id, _)| id).collect();
    let style = if args.ledger { Style::Ledger } else { Style::Native };
    let mut text = String::new();
    for id in ids {
        if args.trim {
            let transaction = ledger.transaction_mut(id);
            transaction.description = trim_whitespace(&transaction.description);
            transaction.note = trim_whitespace(&transaction.note);
        }
        text.push_str(&format_transaction(ledger, id, style));
        text.push('\n');
    }
    text
}

/// Replace `file` through a temporary file in the same directory.
fn write_in_place(file: &Path, text: &str) -> Result<()> {
    let dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    temp.write_all(text.as_bytes())
        .with_context(|| format!("failed to write temp file for {}", file.display()))?;
    temp.persist(file)
        .with_context(|| format!("failed to replace {}", file.display()))?;
    Ok(())
}

/// Run the command.
pub fn run(args: &Args, config: &LoaderConfig, out: &mut dyn Write) -> Result<ExitCode> {
    let mut ledger = Ledger::new();
    let mut loader = Loader::from_config(config);
    for name in [COMMODITIES_FILE, ACCOUNTS_FILE, PRICES_FILE] {
        let path = config.db.join(name);
        if path.is_file() {
            loader
                .load_file(&mut ledger, &path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
    }
    ledger.clear_transactions();

    for file in &args.files {
        loader
            .load_file(&mut ledger, file)
            .with_context(|| format!("failed to load {}", file.display()))?;
        let text = render(&mut ledger, args);
        if args.in_place {
            write_in_place(file, &text)?;
            debug!(file = %file.display(), "formatted in place");
        } else {
            out.write_all(text.as_bytes()).context("failed to write output")?;
        }
        ledger.clear_transactions();
    }
    Ok(ExitCode::SUCCESS)
}
