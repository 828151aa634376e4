//! Monetary amounts and fares.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Error returned when a decimal amount cannot be represented as `Money`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid amount {0}: must be a finite, non-negative number in range")]
pub struct InvalidAmount(pub f64);

/// An amount of money in euro cents.
///
/// The journey API reports fares as decimal euros (`49.9`). We convert to
/// integer cents at the boundary so that summing segment fares is exact.
///
/// # Examples
///
/// ```
/// use split_server::domain::Money;
///
/// let fare = Money::from_decimal(49.9).unwrap();
/// assert_eq!(fare.cents(), 4990);
/// assert_eq!(fare.to_string(), "49.90");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero euros.
    pub const ZERO: Money = Money(0);

    /// Create from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Convert a decimal euro amount, rounding to the nearest cent.
    pub fn from_decimal(amount: f64) -> Result<Self, InvalidAmount> {
        let cents = (amount * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if !cents.is_finite() || amount < 0.0 || cents >= i64::MAX as f64 {
            return Err(InvalidAmount(amount));
        }
        Ok(Money(cents as i64))
    }

    /// Returns the amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the amount as decimal euros.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Subtract, clamping at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

impl Add for Money {
    type Output = Money;

    /// Saturates at the largest representable amount.
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// A fare quoted by the API.
///
/// `hint` carries free text such as "subject to availability". The
/// absence of a `Price` means "unpriceable"; it is never modelled as a
/// zero amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub amount: Money,
    pub hint: Option<String>,
}

impl Price {
    /// A price without a hint.
    pub fn new(amount: Money) -> Self {
        Self { amount, hint: None }
    }
}
