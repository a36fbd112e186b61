//! Per-period sums of postings.

use chrono::NaiveDate;
use coin_core::{Amount, AmountError};
use std::collections::BTreeMap;

use crate::interval::Interval;

/// Sums of posting quantities keyed by period start, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    interval: Interval,
    periods: BTreeMap<NaiveDate, Amount>,
}

impl Totals {
    /// Create empty totals bucketed by `interval`.
    pub const fn new(interval: Interval) -> Self {
        Self {
            interval,
            periods: BTreeMap::new(),
        }
    }

    /// The bucket length.
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Add a quantity posted on `date` to its period.
    pub fn add(&mut self, date: NaiveDate, quantity: &Amount) -> Result<(), AmountError> {
        let start = self.interval.start(date);
        match self.periods.get_mut(&start) {
            Some(sum) => sum.add_in(quantity),
            None => {
                self.periods.insert(start, quantity.clone());
                Ok(())
            }
        }
    }

    /// Add every period of `other` into this one.
    pub fn merge(&mut self, other: &Self) -> Result<(), AmountError> {
        for (&start, sum) in &other.periods {
            match self.periods.get_mut(&start) {
                Some(own) => own.add_in(sum)?,
                None => {
                    self.periods.insert(start, sum.clone());
                }
            }
        }
        Ok(())
    }

    /// Whether no quantity was ever added.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Period starts, in order.
    pub fn periods(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.periods.keys().copied()
    }

    /// Periods with their sums, in order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &Amount)> {
        self.periods.iter().map(|(&start, sum)| (start, sum))
    }

    /// Sum of the period starting at `start`.
    pub fn get(&self, start: NaiveDate) -> Option<&Amount> {
        self.periods.get(&start)
    }

    /// The latest period and its sum.
    pub fn last(&self) -> Option<(NaiveDate, &Amount)> {
        self.periods.iter().next_back().map(|(&start, sum)| (start, sum))
    }

    /// Sums for each of `periods`, with zeros where this row has none.
    ///
    /// Returns `None` for empty totals, which have no commodity to fill with.
    pub fn align(&self, periods: &[NaiveDate]) -> Option<Vec<Amount>> {
        let (_, sample) = self.last()?;
        let zero = Amount::zero(sample.commodity().clone());
        Some(
            periods
                .iter()
                .map(|start| self.periods.get(start).unwrap_or(&zero).clone())
                .collect(),
        )
    }
}

/// Replace each value by the sum of it and all values before it.
pub fn cumulative(values: &mut [Amount]) -> Result<(), AmountError> {
    for i in 1..values.len() {
        let (before, rest) = values.split_at_mut(i);
        rest[0].add_in(&before[i - 1])?;
    }
    Ok(())
}
