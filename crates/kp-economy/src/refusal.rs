//! Expected, player-facing reasons an operation did not happen.

use chrono::TimeDelta;
use kp_core::{Money, humanize};
use thiserror::Error;

/// Why an operation was refused.
///
/// Refusals are normal game flow, not failures: the state is unchanged and
/// the `Display` text is meant to be relayed to the player as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    /// The action is still cooling down.
    #[error("slow down, you can do that again in {}", wait(.remaining))]
    Cooldown {
        /// Time left until the action is allowed.
        remaining: TimeDelta,
    },

    /// The player can't afford it.
    #[error("that costs {needed} and you only have {balance}")]
    InsufficientFunds {
        /// The price.
        needed: Money,
        /// What the player has.
        balance: Money,
    },

    /// The property is already in the player's portfolio.
    #[error("you already own the {0}")]
    AlreadyOwned(String),

    /// The player's rank is below what the substance requires.
    #[error("you need to be a {required} to make {substance}; you're a {current}")]
    RankTooLow {
        /// The substance that was requested.
        substance: String,
        /// Name of the required rank.
        required: String,
        /// Name of the player's rank.
        current: String,
    },

    /// No property exists at that catalog index.
    #[error("there is no property #{0}")]
    UnknownProperty(usize),

    /// No substance goes by that name.
    #[error("nobody around here deals in '{0}'")]
    UnknownSubstance(String),

    /// Collecting with an empty portfolio.
    #[error("you don't own any properties yet")]
    NoProperties,
}

fn wait(remaining: &TimeDelta) -> String {
    humanize(*remaining)
}

impl Refusal {
    /// The remaining wait, for cooldown refusals.
    pub fn remaining(&self) -> Option<TimeDelta> {
        match self {
            Self::Cooldown { remaining } => Some(*remaining),
            _ => None,
        }
    }
}
