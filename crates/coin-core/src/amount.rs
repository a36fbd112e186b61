//! Amount type representing an exact quantity of a commodity.
//!
//! An [`Amount`] stores its value as an arbitrary-precision integer scaled by
//! the commodity's decimal places, so `37.92 CAD` is held as `3792`. There is
//! no floating point anywhere: addition, negation and comparison are exact,
//! and the only rounding happens on explicit division or price conversion.
//!
//! Every binary operation checks that both sides carry the same commodity and
//! returns [`AmountError::CommodityMismatch`] otherwise.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::sync::Arc;

use crate::commodity::Commodity;
use crate::error::AmountError;

/// Textual style used when rendering amounts and entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Style {
    /// `-37.92 CAD`: sign on the number, symbol trailing.
    #[default]
    Native,
    /// `CAD -37.92`: symbol leading, quoted when it is not purely alphabetic.
    Ledger,
}

/// An exact quantity of a commodity.
///
/// # Examples
///
/// ```
/// use coin_core::{Amount, Commodity};
/// use std::sync::Arc;
///
/// let cad = Arc::new(Commodity::new("CAD", 2));
/// let amount = Amount::parse("10.5", cad.clone()).unwrap();
/// assert_eq!(amount.to_string(), "10.50 CAD");
///
/// let third = amount.div_int(3).unwrap();
/// assert_eq!(third.to_string(), "3.50 CAD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    magnitude: BigInt,
    commodity: Arc<Commodity>,
}

impl Amount {
    /// Create an amount from an already scaled magnitude.
    #[must_use]
    pub fn new(magnitude: impl Into<BigInt>, commodity: Arc<Commodity>) -> Self {
        Self {
            magnitude: magnitude.into(),
            commodity,
        }
    }

    /// Create a zero amount of the given commodity.
    #[must_use]
    pub fn zero(commodity: Arc<Commodity>) -> Self {
        Self::new(BigInt::zero(), commodity)
    }

    /// Parse a decimal literal such as `-6000.00`, `+5` or `12.` for a commodity.
    ///
    /// Fewer fractional digits than the commodity's precision are padded with
    /// zeros; more are an error.
    pub fn parse(text: &str, commodity: Arc<Commodity>) -> Result<Self, AmountError> {
        let invalid = || AmountError::InvalidNumber(text.to_string());
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if (whole.is_empty() && fraction.is_empty())
            || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let decimals = commodity.decimals as usize;
        if fraction.len() > decimals {
            return Err(AmountError::Precision {
                text: text.to_string(),
                commodity: commodity.id.clone(),
                decimals: commodity.decimals,
            });
        }

        let mut digits = String::with_capacity(whole.len() + decimals);
        digits.push_str(whole);
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));
        let magnitude: BigInt = digits.parse().map_err(|_| invalid())?;

        Ok(Self::new(
            if negative { -magnitude } else { magnitude },
            commodity,
        ))
    }

    /// Number of fractional digits written in a decimal literal.
    pub fn literal_decimals(text: &str) -> u32 {
        text.split_once('.')
            .map_or(0, |(_, fraction)| fraction.len() as u32)
    }

    /// The scaled integer value.
    pub const fn magnitude(&self) -> &BigInt {
        &self.magnitude
    }

    /// The commodity of this amount.
    pub const fn commodity(&self) -> &Arc<Commodity> {
        &self.commodity
    }

    /// Whether two amounts can be combined without conversion.
    pub fn same_commodity(&self, other: &Self) -> bool {
        self.commodity == other.commodity
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Check if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.magnitude.is_negative()
    }

    /// Get the absolute value of this amount.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.magnitude.abs(), self.commodity.clone())
    }

    fn check(&self, other: &Self) -> Result<(), AmountError> {
        if self.same_commodity(other) {
            Ok(())
        } else {
            Err(AmountError::CommodityMismatch {
                left: self.commodity.id.clone(),
                right: other.commodity.id.clone(),
            })
        }
    }

    /// Add two amounts of the same commodity.
    pub fn checked_add(&self, other: &Self) -> Result<Self, AmountError> {
        self.check(other)?;
        Ok(Self::new(
            &self.magnitude + &other.magnitude,
            self.commodity.clone(),
        ))
    }

    /// Subtract an amount of the same commodity.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, AmountError> {
        self.check(other)?;
        Ok(Self::new(
            &self.magnitude - &other.magnitude,
            self.commodity.clone(),
        ))
    }

    /// Add `other` into `self` in place.
    pub fn add_in(&mut self, other: &Self) -> Result<(), AmountError> {
        self.check(other)?;
        self.magnitude += &other.magnitude;
        Ok(())
    }

    /// Compare two amounts of the same commodity.
    pub fn checked_cmp(&self, other: &Self) -> Result<Ordering, AmountError> {
        self.check(other)?;
        Ok(self.magnitude.cmp(&other.magnitude))
    }

    /// Divide by an integer, truncating toward zero.
    pub fn div_int(&self, divisor: i64) -> Result<Self, AmountError> {
        if divisor == 0 {
            return Err(AmountError::DivideByZero);
        }
        Ok(Self::new(
            &self.magnitude / BigInt::from(divisor),
            self.commodity.clone(),
        ))
    }

    /// The number alone, with the decimal point in place (`-37.92`).
    pub fn render_number(&self) -> String {
        let decimals = self.commodity.decimals as usize;
        let digits = self.magnitude.magnitude().to_string();
        let mut out = String::with_capacity(digits.len() + decimals + 2);
        if self.magnitude.is_negative() {
            out.push('-');
        }
        if decimals == 0 {
            out.push_str(&digits);
            return out;
        }
        let padded = format!("{digits:0>width$}", width = decimals + 1);
        let point = padded.len() - decimals;
        out.push_str(&padded[..point]);
        out.push('.');
        out.push_str(&padded[point..]);
        out
    }

    /// Render in the requested style.
    pub fn render(&self, style: Style) -> String {
        match style {
            Style::Native => format!("{} {}", self.render_number(), self.commodity.id),
            Style::Ledger => format!(
                "{} {}",
                self.commodity.safe_id(true),
                self.render_number()
            ),
        }
    }
}

/// Integer division rounding half away from zero.
pub(crate) fn div_round(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    let quotient = numerator / denominator;
    let remainder = numerator - &quotient * denominator;
    if remainder.is_zero() || remainder.abs() * 2 < denominator.abs() {
        return quotient;
    }
    if numerator.is_negative() == denominator.is_negative() {
        quotient + 1
    } else {
        quotient - 1
    }
}

/// `10^exponent` as a big integer.
pub(crate) fn scale(exponent: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exponent as usize)
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.magnitude, self.commodity)
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount::new(-&self.magnitude, self.commodity.clone())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Style::Native))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
