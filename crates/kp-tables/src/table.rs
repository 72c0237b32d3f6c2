//! Weighted event tables.
//!
//! A roll draws `pick` uniformly from `[0, total_weight)` and walks the
//! outcomes in order, keeping a running sum of weights. The first outcome
//! whose running sum exceeds `pick` is chosen.

use kp_core::Delta;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::message::MessageTemplate;
use crate::value::ValueRule;

/// Message used when a roll somehow selects nothing.
const FALLBACK_MESSAGE: &str = "Nothing happened.";

/// One entry of an event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Relative likelihood. Must be positive.
    pub weight: u32,
    /// How much money this outcome moves.
    pub value: ValueRule,
    /// What the player is told.
    pub message: MessageTemplate,
}

impl Outcome {
    /// Build an outcome.
    pub fn new(weight: u32, value: ValueRule, message: impl Into<MessageTemplate>) -> Self {
        Self {
            weight,
            value,
            message: message.into(),
        }
    }
}

/// The result of one roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roll {
    /// Index of the chosen outcome, or `None` for the neutral fallback.
    pub outcome: Option<usize>,
    /// The realized delta.
    pub delta: Delta,
    /// The rendered message.
    pub message: String,
}

impl Roll {
    /// The zero-delta result returned when selection falls through.
    pub fn neutral() -> Self {
        Self {
            outcome: None,
            delta: Delta::ZERO,
            message: FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// An immutable, validated list of weighted outcomes.
///
/// Deserializes from a plain list of outcomes and runs the same validation
/// as [`EventTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Outcome>", into = "Vec<Outcome>")]
pub struct EventTable {
    outcomes: Vec<Outcome>,
    total_weight: u64,
}

impl EventTable {
    /// Validate and build a table.
    pub fn new(outcomes: Vec<Outcome>) -> TableResult<Self> {
        if outcomes.is_empty() {
            return Err(TableError::Empty);
        }
        let mut total_weight: u64 = 0;
        for (index, outcome) in outcomes.iter().enumerate() {
            if outcome.weight == 0 {
                return Err(TableError::ZeroWeight { index });
            }
            if let Some((min, max)) = outcome.value.bounds().filter(|(min, max)| min > max) {
                return Err(TableError::InvertedRange { index, min, max });
            }
            total_weight = total_weight
                .checked_add(u64::from(outcome.weight))
                .ok_or(TableError::WeightOverflow)?;
        }
        Ok(Self {
            outcomes,
            total_weight,
        })
    }

    /// The outcomes, in selection order.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Probability of selecting the outcome at `index`.
    pub fn probability(&self, index: usize) -> f64 {
        match self.outcomes.get(index) {
            Some(o) if self.total_weight > 0 => f64::from(o.weight) / self.total_weight as f64,
            _ => 0.0,
        }
    }

    /// Map a draw in `[0, total_weight)` to an outcome index.
    pub fn select(&self, pick: u64) -> Option<usize> {
        let mut tally: u64 = 0;
        for (index, outcome) in self.outcomes.iter().enumerate() {
            tally += u64::from(outcome.weight);
            if tally > pick {
                return Some(index);
            }
        }
        None
    }

    /// Roll the table once.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Roll {
        if self.total_weight == 0 {
            tracing::warn!("rolled an event table with no weight");
            return Roll::neutral();
        }
        let pick = rng.random_range(0..self.total_weight);
        let Some(index) = self.select(pick) else {
            tracing::warn!(pick, total = self.total_weight, "weighted selection fell through");
            return Roll::neutral();
        };
        let outcome = &self.outcomes[index];
        let delta = outcome.value.sample(rng);
        Roll {
            outcome: Some(index),
            delta,
            message: outcome.message.render(delta),
        }
    }
}

impl TryFrom<Vec<Outcome>> for EventTable {
    type Error = TableError;

    fn try_from(outcomes: Vec<Outcome>) -> TableResult<Self> {
        Self::new(outcomes)
    }
}

impl From<EventTable> for Vec<Outcome> {
    fn from(table: EventTable) -> Self {
        table.outcomes
    }
}
