//! Money type for ledger amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. The canonical text form is a plain two-decimal string such as
//! `100.00`; this is what gets encrypted into transfer commands and written to
//! the ledger file.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by every amount
pub const SCALE: usize = 2;

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use envelope_ledger::models::Money;
    /// let amount = Money::from_cents(10000);
    /// assert_eq!(amount.to_string(), "100.00");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Add two amounts, or `None` when the result leaves the `i64` cent range
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Total of a sequence of amounts, or `None` on overflow
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |total, amount| total.checked_add(amount))
    }

    /// Parse a plain decimal amount
    ///
    /// Accepts `100`, `100.5`, `100.50` and a leading `-`. Rejects more than
    /// two fractional digits, currency symbols, and values that overflow.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s;
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(MoneyParseError::InvalidFormat(original.to_string()));
        }
        if s.contains('.') && fraction.is_empty() {
            return Err(MoneyParseError::InvalidFormat(original.to_string()));
        }
        if fraction.len() > SCALE {
            return Err(MoneyParseError::TooManyDecimals(original.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(original.to_string());
        let units: i64 = whole.parse().map_err(|_| overflow())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse().map_err(|_| overflow())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Money::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooManyDecimals(String),
    Overflow(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::TooManyDecimals(s) => {
                write!(f, "Amount has more than {} decimal places: {}", SCALE, s)
            }
            MoneyParseError::Overflow(s) => write!(f, "Amount out of range: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
