//! Argument definitions and command dispatch.

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use coin_core::{Ledger, DATE_FORMAT};
use coin_loader::{LoadResult, Loader, LoaderConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cmd::{check, format, register, stats, test};

/// Plain-text double-entry accounting.
#[derive(Parser, Debug)]
#[command(name = "coin", author, version, about, long_about = None)]
pub struct Cli {
    /// Ledger directory
    #[arg(long, env = "COINDB", default_value = ".", global = true)]
    pub db: PathBuf,

    /// Day relative dates count from, YYYY/MM/DD (default: today)
    #[arg(long, env = "COIN_TODAY", value_parser = parse_day, global = true)]
    pub today: Option<NaiveDate>,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List postings, period totals or rollups of accounts
    #[command(visible_aliases = ["reg", "r"])]
    Register(register::Args),

    /// Show ledger statistics, duplicate or unbalanced transactions
    #[command(visible_alias = "s")]
    Stats(stats::Args),

    /// Report failed assertions, unbalanced and duplicate transactions
    Check(check::Args),

    /// Render the transactions of ledger files in canonical form
    #[command(visible_aliases = ["fmt", "f"])]
    Format(format::Args),

    /// Run the test blocks of a ledger file
    #[command(visible_alias = "t")]
    Test(test::Args),
}

fn parse_day(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|e| format!("expected YYYY/MM/DD: {e}"))
}

impl Cli {
    /// Loader configuration from the global options.
    pub fn config(&self) -> LoaderConfig {
        LoaderConfig::new(
            &self.db,
            self.today.unwrap_or_else(|| Local::now().date_naive()),
        )
    }

    /// Run the command, writing its output to `out`.
    pub fn run(&self, out: &mut dyn Write) -> Result<ExitCode> {
        let config = self.config();
        match &self.command {
            Command::Format(args) => format::run(args, &config, out),
            Command::Test(args) => test::run(args, &config, out),
            Command::Check(args) => {
                let (ledger, result) = load_db(&config);
                check::report(args, &ledger, &result.errors, out)
            }
            command => {
                let (ledger, _) = load_db(&config);
                command.execute(&ledger, config.reference_date, out)
            }
        }
    }
}

impl Command {
    /// Run a read-only command against an already loaded ledger.
    pub fn execute(&self, ledger: &Ledger, today: NaiveDate, out: &mut dyn Write) -> Result<ExitCode> {
        match self {
            Self::Register(args) => register::execute(args, ledger, today, out),
            Self::Stats(args) => stats::execute(args, ledger, out),
            Self::Check(args) => check::report(args, ledger, &[], out),
            Self::Format(_) => bail!("format cannot run against a loaded ledger"),
            Self::Test(_) => bail!("test cannot run against a loaded ledger"),
        }
    }
}

/// Load every file of the ledger directory.
///
/// Errors are returned with the result; the loader has already logged them.
pub fn load_db(config: &LoaderConfig) -> (Ledger, LoadResult) {
    let mut ledger = Ledger::new();
    let result = Loader::from_config(config).load_all(&mut ledger, &config.db);
    (ledger, result)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main entry point of the `coin` binary.
pub fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = io::stdout().lock();
    match cli.run(&mut stdout) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
