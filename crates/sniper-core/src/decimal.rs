//! Precision-safe decimal types for order-book values.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Parsing goes through
//! `Decimal::from_str`, which always expects `.` as the decimal separator
//! and never consults the process locale.

use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Parse exchange decimal text, accepting plain and scientific notation.
fn parse_decimal(text: &str) -> Result<Decimal> {
    let text = text.trim();
    match Decimal::from_str(text) {
        Ok(value) => Ok(value),
        Err(plain_err) => Decimal::from_scientific(text).map_err(|_| plain_err.into()),
    }
}

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Parse a non-negative price from exchange text.
    pub fn parse(text: &str) -> Result<Self> {
        let value = parse_decimal(text)?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CoreError::InvalidPrice(text.to_string()));
        }
        Ok(Self(value))
    }

    /// Absolute distance from `reference` as a percentage of `reference`.
    ///
    /// Returns None when the reference price is zero or the result does not
    /// fit in a `Decimal`.
    #[inline]
    pub fn distance_pct(&self, reference: Price) -> Option<Decimal> {
        if reference.is_zero() {
            return None;
        }
        self.0
            .checked_sub(reference.0)?
            .abs()
            .checked_div(reference.0)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Midpoint between `self` and `other`; None on overflow.
    #[inline]
    pub fn midpoint(&self, other: Price) -> Option<Price> {
        self.0
            .checked_add(other.0)?
            .checked_div(Decimal::TWO)
            .map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Size/quantity with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a non-negative quantity from exchange text.
    pub fn parse(text: &str) -> Result<Self> {
        let value = parse_decimal(text)?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CoreError::InvalidSize(text.to_string()));
        }
        Ok(Self(value))
    }

    /// Relative change from `previous` to `self` (e.g. 0.3 = +30%).
    ///
    /// Returns None when the previous size is zero or the ratio overflows.
    #[inline]
    pub fn relative_change(&self, previous: Size) -> Option<Decimal> {
        if previous.is_zero() {
            return None;
        }
        self.0.checked_sub(previous.0)?.checked_div(previous.0)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
