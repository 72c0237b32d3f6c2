//! Value rules: how an outcome decides how much money moves.

use kp_core::Delta;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Produces the signed money delta of an outcome.
///
/// Negative values take money away. Random rules draw from the generator
/// passed to [`ValueRule::sample`]; callers sample once per roll and use
/// the result for both the message and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRule {
    /// Always the same amount.
    Fixed {
        /// Signed amount in cents.
        cents: i64,
    },
    /// Uniform over an inclusive range of cents.
    Cents {
        /// Lowest possible value.
        min: i64,
        /// Highest possible value.
        max: i64,
    },
    /// Uniform over an inclusive range of whole dollars.
    Dollars {
        /// Lowest possible value.
        min: i64,
        /// Highest possible value.
        max: i64,
    },
}

impl ValueRule {
    /// A rule that never moves money.
    pub const NOTHING: Self = Self::Fixed { cents: 0 };

    /// The `(min, max)` bounds of a random rule, as written.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Fixed { .. } => None,
            Self::Cents { min, max } | Self::Dollars { min, max } => Some((*min, *max)),
        }
    }

    /// Realize the rule once.
    ///
    /// An inverted range (rejected when tables are built) yields zero
    /// instead of panicking.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Delta {
        match *self {
            Self::Fixed { cents } => Delta::from_cents(cents),
            Self::Cents { min, max } if min <= max => Delta::from_cents(rng.random_range(min..=max)),
            Self::Dollars { min, max } if min <= max => {
                Delta::from_cents(rng.random_range(min..=max).saturating_mul(100))
            }
            Self::Cents { .. } | Self::Dollars { .. } => Delta::ZERO,
        }
    }
}
