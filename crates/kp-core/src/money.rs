use std::iter::Sum;

use serde::{Deserialize, Serialize};

/// A non-negative amount of money, stored as whole cents.
///
/// Balances, prices and proceeds are all `Money`. Arithmetic saturates
/// instead of wrapping, and subtraction floors at zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(0);

    /// Create an amount from cents.
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole dollars.
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// The amount in cents.
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, saturating at the maximum.
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtract, flooring at zero.
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Subtract, or `None` if `other` is larger than `self`.
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Multiply by a whole quantity, saturating at the maximum.
    pub const fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    /// Apply a signed delta. Negative deltas floor at zero.
    pub fn apply(self, delta: Delta) -> Self {
        if delta.is_negative() {
            self.saturating_sub(delta.magnitude())
        } else {
            self.saturating_add(delta.magnitude())
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// A signed change in money, in cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Delta(i64);

impl Delta {
    /// No change.
    pub const ZERO: Self = Self(0);

    /// Create a delta from signed cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The delta in signed cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether this delta takes money away.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether this delta changes nothing.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The absolute size of the delta.
    pub const fn magnitude(self) -> Money {
        Money(self.0.unsigned_abs())
    }

    /// The signed difference `after - before`.
    pub fn between(before: Money, after: Money) -> Self {
        let diff = i128::from(after.cents()) - i128::from(before.cents());
        Self(i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX }))
    }
}

impl std::fmt::Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "{}", Money::ZERO),
            1.. => write!(f, "+{}", self.magnitude()),
            _ => write!(f, "-{}", self.magnitude()),
        }
    }
}

impl From<Money> for Delta {
    fn from(money: Money) -> Self {
        Self(i64::try_from(money.cents()).unwrap_or(i64::MAX))
    }
}
