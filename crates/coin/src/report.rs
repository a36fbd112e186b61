//! Fixed-width rendering of command output.

use coin_core::DATE_FORMAT;
use coin_query::{shorten_account_name, Register, Report, Rollup, RowKind};
use similar::TextDiff;
use std::io::{self, Write};

/// Widest a description or account column grows.
const MAX_COLUMN: usize = 50;

fn width<'a>(cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(|cell| cell.chars().count()).max().unwrap_or(0).min(MAX_COLUMN)
}

/// Write a register: a `FullName Commodity` header, then one line per row.
pub fn write_register(out: &mut dyn Write, register: &Register, label_width: usize) -> io::Result<()> {
    writeln!(out, "{} {}", register.account, register.commodity)?;
    match &register.report {
        Report::Postings(rows) => {
            let desc = width(rows.iter().map(|r| r.description.as_str()));
            let other = width(rows.iter().map(|r| r.other.as_str()));
            for row in rows {
                writeln!(
                    out,
                    "{} | {:>desc$} | {:>other$} | {:>10} | {:>10}",
                    row.date.format(DATE_FORMAT),
                    row.description,
                    row.other,
                    row.quantity.render_number(),
                    row.total.render_number(),
                )?;
            }
        }
        Report::Buckets { interval, rows } => {
            for row in rows {
                writeln!(
                    out,
                    "{} | {:>12} | {:>12}",
                    interval.label(row.period),
                    row.amount.render_number(),
                    row.total.render_number(),
                )?;
            }
        }
        Report::Recursive(rows) => {
            let desc = width(rows.iter().map(|r| r.description.as_str()));
            let account = width(rows.iter().map(|r| r.account.as_str()));
            let other = width(rows.iter().map(|r| r.other.as_str()));
            for row in rows {
                writeln!(
                    out,
                    "{} | {:>desc$} | {:>account$} | {:>other$} | {:>10} {}",
                    row.date.format(DATE_FORMAT),
                    row.description,
                    row.account,
                    row.other,
                    row.quantity.render_number(),
                    row.commodity,
                )?;
            }
        }
        Report::Rollup(rollup) => write_rollup(out, rollup, label_width)?,
    }
    Ok(())
}

/// A rollup as a table: one column per row of the rollup, one line per
/// period, under a header of column labels.
fn write_rollup(out: &mut dyn Write, rollup: &Rollup, label_width: usize) -> io::Result<()> {
    if rollup.rows.is_empty() {
        return Ok(());
    }
    let labels: Vec<String> = rollup
        .rows
        .iter()
        .map(|row| match row.kind {
            RowKind::Account => shorten_account_name(&row.label, label_width),
            RowKind::Other | RowKind::Totals => row.label.clone(),
        })
        .collect();
    let cells: Vec<Vec<String>> = rollup
        .rows
        .iter()
        .map(|row| row.values.iter().map(|v| v.render_number()).collect())
        .collect();
    let widths: Vec<usize> = labels
        .iter()
        .zip(&cells)
        .map(|(label, column)| {
            column
                .iter()
                .map(String::len)
                .chain([label.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();
    let periods: Vec<String> = rollup
        .periods
        .iter()
        .map(|&start| rollup.interval.label(start))
        .collect();
    let first = periods.iter().map(String::len).max().unwrap_or(0);

    let mut header = format!("{:first$}", "");
    for (label, width) in labels.iter().zip(&widths) {
        header.push_str(&format!(" | {label:>width$}"));
    }
    writeln!(out, "{header}")?;
    for (index, period) in periods.iter().enumerate() {
        let mut line = period.clone();
        for (column, width) in cells.iter().zip(&widths) {
            line.push_str(&format!(" | {:>width$}", column[index]));
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Write a unified diff turning `expected` into `actual`.
pub fn write_diff(out: &mut dyn Write, expected: &str, actual: &str) -> io::Result<()> {
    let diff = TextDiff::from_lines(expected, actual);
    write!(out, "{}", diff.unified_diff().header("expected", "actual"))
}

/// Print a summary of errors and warnings.
pub fn write_summary(out: &mut dyn Write, errors: usize, warnings: usize) -> io::Result<()> {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    match (errors, warnings) {
        (0, 0) => writeln!(out, "No errors found"),
        (_, 0) => writeln!(out, "{}", plural(errors, "error")),
        (0, _) => writeln!(out, "{}", plural(warnings, "warning")),
        _ => writeln!(out, "{}, {}", plural(errors, "error"), plural(warnings, "warning")),
    }
}
