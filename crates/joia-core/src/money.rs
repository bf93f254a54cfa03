//! # Money
//!
//! Prices in Brazilian reais, held as integer centavos.
//! The store API speaks decimal strings (`"159.99"`); this module converts
//! at the boundary so cart arithmetic never touches floating point.

use crate::error::{ShopError, ShopResult};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Currency symbol shown in front of every price
pub const CURRENCY_SYMBOL: &str = "R$";

/// A price in centavos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Zero reais
    pub const ZERO: Price = Price { cents: 0 };

    /// Create a price from centavos
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Amount in centavos
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Parse a decimal amount as typed in a form or sent by the API.
    ///
    /// Accepts `"159.99"`, `"159,99"`, `"159"` and `"1.5"`. A comma is
    /// read as the decimal separator.
    pub fn parse(input: &str) -> ShopResult<Self> {
        let normalized = input.trim().replace(',', ".");
        if normalized.is_empty() {
            return Err(invalid("empty amount"));
        }
        if normalized.starts_with('-') {
            return Err(invalid("amount cannot be negative"));
        }

        let (whole, fraction) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        if fraction.contains('.') {
            return Err(invalid(&format!("malformed amount: {}", input)));
        }
        if fraction.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid(&format!("malformed amount: {}", input)));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid(&format!("not a number: {}", input)));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| invalid(&format!("amount too large: {}", input)))?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .map(Self::from_cents)
            .ok_or_else(|| invalid(&format!("amount too large: {}", input)))
    }

    /// Price of `quantity` units
    pub fn times(&self, quantity: u32) -> Self {
        Self::from_cents(self.cents.saturating_mul(i64::from(quantity)))
    }

    /// True for a zero amount
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Decimal form used on the wire, e.g. `"159.99"`
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Format for display (e.g., "R$ 159.99")
    pub fn display(&self) -> String {
        format!("{} {}", CURRENCY_SYMBOL, self.to_decimal_string())
    }
}

fn invalid(message: &str) -> ShopError {
    ShopError::InvalidPrice {
        message: message.to_string(),
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        Price::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        if v < 0 {
            return Err(E::custom("amount cannot be negative"));
        }
        v.checked_mul(100)
            .map(Price::from_cents)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("amount too large"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        if !v.is_finite() || v < 0.0 {
            return Err(E::custom("amount must be a non-negative number"));
        }
        Ok(Price::from_cents((v * 100.0).round() as i64))
    }
}
