//! Transaction interpolation.
//!
//! Infers an elided posting quantity and computes the residual of a
//! transaction across commodities.

use chrono::NaiveDate;
use coin_core::{Amount, AmountError, Commodity, Prices};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    /// No price converts between the two commodities at the posted date.
    #[error("no price to convert {from} into {to}")]
    NoPrice {
        /// Commodity of the posting being converted.
        from: String,
        /// Commodity of the elided posting.
        to: String,
    },

    /// Arithmetic failed while summing postings.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// The commodity used by most of `quantities`; ties go to the first seen.
pub fn majority<'a>(quantities: impl IntoIterator<Item = &'a Amount>) -> Option<Arc<Commodity>> {
    let mut counts: Vec<(&Arc<Commodity>, usize)> = Vec::new();
    for quantity in quantities {
        match counts.iter_mut().find(|(c, _)| *c == quantity.commodity()) {
            Some((_, count)) => *count += 1,
            None => counts.push((quantity.commodity(), 1)),
        }
    }
    let mut best: Option<(&Arc<Commodity>, usize)> = None;
    for (commodity, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((commodity, count));
        }
    }
    best.map(|(commodity, _)| commodity.clone())
}

/// The quantity of an elided posting: the negated sum of `quantities`,
/// expressed in `target`.
///
/// Quantities in other commodities are converted with the price in effect
/// on `date`.
pub fn interpolate(
    quantities: &[&Amount],
    target: &Arc<Commodity>,
    prices: &Prices,
    date: NaiveDate,
) -> Result<Amount, InterpolationError> {
    let mut sum = Amount::zero(target.clone());
    for quantity in quantities {
        let converted = prices.convert(quantity, target, date).ok_or_else(|| {
            InterpolationError::NoPrice {
                from: quantity.commodity().id.clone(),
                to: target.id.clone(),
            }
        })??;
        sum.add_in(&converted)?;
    }
    Ok(-sum)
}

/// What is left when a transaction's quantities are summed.
///
/// With a single commodity this is the plain sum. With several, every
/// per-commodity sum is converted into the majority commodity; if any of
/// them has no applicable price the transaction is an implicit exchange and
/// `None` is returned.
pub fn residual(
    quantities: &[&Amount],
    prices: &Prices,
    date: NaiveDate,
) -> Result<Option<Amount>, AmountError> {
    let mut groups: Vec<Amount> = Vec::new();
    for quantity in quantities {
        match groups.iter_mut().find(|g| g.same_commodity(quantity)) {
            Some(group) => group.add_in(quantity)?,
            None => groups.push((*quantity).clone()),
        }
    }
    let Some(reference) = majority(quantities.iter().copied()) else {
        return Ok(None);
    };
    let mut total = Amount::zero(reference.clone());
    for group in &groups {
        match prices.convert(group, &reference, date) {
            Some(converted) => total.add_in(&converted?)?,
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}
