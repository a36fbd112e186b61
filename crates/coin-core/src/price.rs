//! Prices and the time-ordered price database.
//!
//! A [`Price`] records that one unit of `commodity` was worth `value` (an
//! amount of another commodity, the currency) on a date. [`Prices`] keeps
//! them sorted by date so that lookups find the most recent rate at or
//! before a query date.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::amount::{div_round, scale, Amount};
use crate::commodity::Commodity;
use crate::error::AmountError;

/// An exchange rate between two commodities at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Price {
    /// Date of the rate.
    pub date: NaiveDate,
    /// The commodity being priced.
    pub commodity: Arc<Commodity>,
    /// Value of one unit of `commodity`, expressed in the currency.
    pub value: Amount,
}

impl Price {
    /// Create a new price.
    pub const fn new(date: NaiveDate, commodity: Arc<Commodity>, value: Amount) -> Self {
        Self {
            date,
            commodity,
            value,
        }
    }

    /// The commodity the price is expressed in.
    pub const fn currency(&self) -> &Arc<Commodity> {
        self.value.commodity()
    }

    /// Convert an amount across this price, in either direction.
    ///
    /// An amount of `commodity` becomes an amount of the currency, and an
    /// amount of the currency becomes an amount of `commodity`. The result is
    /// rounded half away from zero to the target's decimal places.
    pub fn convert(&self, amount: &Amount) -> Result<Amount, AmountError> {
        let source = amount.commodity();
        if **source == *self.commodity {
            // units * (price / 10^price_dec) scaled to currency decimals
            let numerator = amount.magnitude() * self.value.magnitude();
            let magnitude = div_round(&numerator, &scale(self.commodity.decimals));
            return Ok(Amount::new(magnitude, self.currency().clone()));
        }
        if **source == **self.currency() {
            if self.value.is_zero() {
                return Err(AmountError::DivideByZero);
            }
            let numerator = amount.magnitude() * scale(self.commodity.decimals);
            let magnitude = div_round(&numerator, self.value.magnitude());
            return Ok(Amount::new(magnitude, self.commodity.clone()));
        }
        Err(AmountError::CommodityMismatch {
            left: source.id.clone(),
            right: self.commodity.id.clone(),
        })
    }
}

/// All recorded prices, ordered by date.
///
/// Prices recorded on the same date keep their insertion order, so the last
/// one read wins a lookup.
#[derive(Debug, Clone, Default)]
pub struct Prices {
    entries: Vec<Price>,
}

impl Prices {
    /// Create an empty price database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a price.
    pub fn insert(&mut self, price: Price) {
        let at = self.entries.partition_point(|p| p.date <= price.date);
        self.entries.insert(at, price);
    }

    /// Number of recorded prices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no price is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All prices in date order.
    pub fn iter(&self) -> impl Iterator<Item = &Price> {
        self.entries.iter()
    }

    /// The most recent price of `commodity` in `currency` at or before `date`.
    pub fn latest(&self, commodity: &str, currency: &str, date: NaiveDate) -> Option<&Price> {
        let end = self.entries.partition_point(|p| p.date <= date);
        self.entries[..end]
            .iter()
            .rev()
            .find(|p| p.commodity.id == commodity && p.currency().id == currency)
    }

    /// A price usable to convert between `from` and `to` at `date`.
    ///
    /// A direct `from`→`to` price is preferred; the inverse pair is used when
    /// no direct price exists.
    pub fn between(&self, from: &str, to: &str, date: NaiveDate) -> Option<&Price> {
        self.latest(from, to, date)
            .or_else(|| self.latest(to, from, date))
    }

    /// Convert `amount` into `to` using the rate in effect at `date`.
    ///
    /// Returns `None` when no applicable price exists.
    pub fn convert(
        &self,
        amount: &Amount,
        to: &Arc<Commodity>,
        date: NaiveDate,
    ) -> Option<Result<Amount, AmountError>> {
        if amount.commodity() == to {
            return Some(Ok(amount.clone()));
        }
        self.between(&amount.commodity().id, &to.id, date)
            .map(|price| price.convert(amount))
    }
}
