//! Report periods.

use chrono::{Datelike, Days, NaiveDate};
use coin_core::{DATE_FORMAT, MONTH_FORMAT, YEAR_FORMAT};
use serde::Serialize;
use std::fmt;

/// Length of a report bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Weeks starting on Monday.
    Week,
    /// Calendar months.
    Month,
    /// Calendar years.
    Year,
}

impl Interval {
    /// First day of the period containing `date`.
    pub fn start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(offset)).unwrap_or(date)
            }
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// `strftime` format used to label periods of this length.
    pub const fn format(self) -> &'static str {
        match self {
            Self::Week => DATE_FORMAT,
            Self::Month => MONTH_FORMAT,
            Self::Year => YEAR_FORMAT,
        }
    }

    /// Label of the period starting at `start`.
    pub fn label(self, start: NaiveDate) -> String {
        start.format(self.format()).to_string()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "weekly",
            Self::Month => "monthly",
            Self::Year => "yearly",
        })
    }
}
