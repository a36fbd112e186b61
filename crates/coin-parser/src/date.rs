//! Absolute and relative dates.
//!
//! Relative dates such as `+3d`, `-1m` or `+2y` are offsets from a reference
//! date supplied by the caller, which keeps fixtures deterministic.

use chrono::{Days, Months, NaiveDate};

/// Parse `YYYY/MM/DD` or a `±N(d|m|y)` offset from `reference`.
///
/// Returns `None` for malformed text, impossible dates and offsets that
/// leave the supported calendar range.
pub fn parse_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    match text.as_bytes().first()? {
        b'+' | b'-' => parse_relative(text, reference),
        _ => parse_absolute(text),
    }
}

fn parse_absolute(text: &str) -> Option<NaiveDate> {
    let mut parts = text.splitn(3, '/');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_relative(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let negative = text.starts_with('-');
    let unit = text.chars().last()?;
    let count: u32 = text.get(1..text.len() - 1)?.parse().ok()?;
    match (unit, negative) {
        ('d', false) => reference.checked_add_days(Days::new(count.into())),
        ('d', true) => reference.checked_sub_days(Days::new(count.into())),
        ('m', false) => reference.checked_add_months(Months::new(count)),
        ('m', true) => reference.checked_sub_months(Months::new(count)),
        ('y', false) => reference.checked_add_months(Months::new(count.checked_mul(12)?)),
        ('y', true) => reference.checked_sub_months(Months::new(count.checked_mul(12)?)),
        _ => None,
    }
}
