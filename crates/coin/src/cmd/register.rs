//! The `register` command.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use coin_core::{Ledger, TagMatcher};
use coin_parser::date::parse_date;
use coin_query::{register, Interval, Register, RegisterOptions, DEFAULT_TOP};
use rayon::prelude::*;
use std::io::Write;
use std::process::ExitCode;

use crate::report;

/// Default maximum width of a rollup column label.
pub const DEFAULT_LABEL_WIDTH: usize = 12;

/// List postings, period totals or rollups of accounts.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Account patterns, e.g. `exp:groc`
    #[arg(value_name = "ACCOUNT", required = true)]
    pub patterns: Vec<String>,

    /// Include postings of sub-accounts
    #[arg(short, long)]
    pub recurse: bool,

    /// Begin register from this date (YYYY/MM/DD or an offset like -3m)
    #[arg(short, long, value_name = "DATE", allow_hyphen_values = true)]
    pub begin: Option<String>,

    /// End register before this date (YYYY/MM/DD or an offset like -3m)
    #[arg(short, long, value_name = "DATE", allow_hyphen_values = true)]
    pub end: Option<String>,

    /// Aggregate postings by week
    #[arg(short, long, conflicts_with_all = ["monthly", "yearly"])]
    pub weekly: bool,

    /// Aggregate postings by month
    #[arg(short, long, conflicts_with = "yearly")]
    pub monthly: bool,

    /// Aggregate postings by year
    #[arg(short, long)]
    pub yearly: bool,

    /// Sub-accounts shown individually in aggregate results
    #[arg(short, long, default_value_t = DEFAULT_TOP)]
    pub top: usize,

    /// Show running values in aggregate results
    #[arg(short, long)]
    pub cumulative: bool,

    /// Maximum width of a column label
    #[arg(short = 'l', long, default_value_t = DEFAULT_LABEL_WIDTH)]
    pub label_width: usize,

    /// Only postings tagged KEY[:VALUE] (both regular expressions)
    #[arg(long, value_name = "KEY[:VALUE]")]
    pub tag: Option<String>,

    /// Print the registers as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    const fn interval(&self) -> Option<Interval> {
        if self.weekly {
            Some(Interval::Week)
        } else if self.monthly {
            Some(Interval::Month)
        } else if self.yearly {
            Some(Interval::Year)
        } else {
            None
        }
    }

    /// Query options, with relative dates resolved against `today`.
    pub fn options(&self, today: NaiveDate) -> Result<RegisterOptions> {
        let date = |text: &Option<String>| {
            text.as_deref()
                .map(|text| parse_date(text, today).ok_or_else(|| anyhow!("invalid date: {text}")))
                .transpose()
        };
        let tag = self
            .tag
            .as_deref()
            .map(|expression| {
                TagMatcher::new(expression).with_context(|| format!("invalid tag filter: {expression}"))
            })
            .transpose()?;
        Ok(RegisterOptions {
            recurse: self.recurse,
            begin: date(&self.begin)?,
            end: date(&self.end)?,
            interval: self.interval(),
            top: self.top,
            cumulative: self.cumulative,
            tag,
        })
    }
}

/// Run the command.
pub fn execute(args: &Args, ledger: &Ledger, today: NaiveDate, out: &mut dyn Write) -> Result<ExitCode> {
    let options = args.options(today)?;
    let registers: Vec<Register> = args
        .patterns
        .par_iter()
        .map(|pattern| {
            register(ledger, pattern, &options).with_context(|| format!("register {pattern}"))
        })
        .collect::<Result<_>>()?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &registers).context("failed to write JSON")?;
        writeln!(out)?;
        return Ok(ExitCode::SUCCESS);
    }
    for (index, register) in registers.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        report::write_register(out, register, args.label_width)?;
    }
    Ok(ExitCode::SUCCESS)
}
