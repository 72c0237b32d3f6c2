//! Progression ranks unlocked by lifetime sales.

use kp_core::Money;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// One tier of the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
    /// Display name, e.g. "Dealer".
    pub name: String,
    /// Lifetime proceeds needed to reach this tier (inclusive).
    #[serde(rename = "threshold_cents")]
    pub threshold: Money,
}

/// The ascending rank ladder. A rank is an index into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable(Vec<RankTier>);

impl RankTable {
    /// Build and validate a ladder.
    pub fn new(tiers: Vec<RankTier>) -> ConfigResult<Self> {
        let table = Self(tiers);
        table.validate()?;
        Ok(table)
    }

    /// Check that the ladder starts at zero and strictly ascends.
    pub fn validate(&self) -> ConfigResult<()> {
        let first = self
            .0
            .first()
            .ok_or_else(|| ConfigError::Invalid("rank table is empty".into()))?;
        if !first.threshold.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "first rank '{}' must have a zero threshold",
                first.name
            )));
        }
        for pair in self.0.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ConfigError::Invalid(format!(
                    "rank '{}' must have a higher threshold than '{}'",
                    pair[1].name, pair[0].name
                )));
            }
        }
        Ok(())
    }

    /// All tiers, lowest first.
    pub fn tiers(&self) -> &[RankTier] {
        &self.0
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ladder has no tiers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The highest rank whose threshold is at or below `proceeds`.
    pub fn rank_for(&self, proceeds: Money) -> usize {
        self.0
            .iter()
            .rposition(|tier| tier.threshold <= proceeds)
            .unwrap_or(0)
    }

    /// Display name of a rank.
    pub fn name(&self, rank: usize) -> &str {
        self.0.get(rank).map_or("Unknown", |tier| tier.name.as_str())
    }

    /// The tier after `rank`, if any.
    pub fn next(&self, rank: usize) -> Option<&RankTier> {
        self.0.get(rank + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ladder() -> RankTable {
        RankTable::new(vec![
            RankTier {
                name: "Nobody".into(),
                threshold: Money::ZERO,
            },
            RankTier {
                name: "Corner Boy".into(),
                threshold: Money::from_dollars(1_000),
            },
            RankTier {
                name: "Dealer".into(),
                threshold: Money::from_dollars(5_000),
            },
        ])
        .unwrap()
    }

    #[test]
    fn threshold_is_inclusive() {
        let ranks = ladder();
        assert_eq!(ranks.rank_for(Money::ZERO), 0);
        assert_eq!(ranks.rank_for(Money::from_cents(99_999)), 0);
        assert_eq!(ranks.rank_for(Money::from_dollars(1_000)), 1);
        assert_eq!(ranks.rank_for(Money::from_dollars(5_000)), 2);
        assert_eq!(ranks.rank_for(Money::from_dollars(1_000_000)), 2);
    }

    #[test]
    fn names_and_next() {
        let ranks = ladder();
        assert_eq!(ranks.name(1), "Corner Boy");
        assert_eq!(ranks.name(9), "Unknown");
        assert_eq!(ranks.next(0).map(|t| t.name.as_str()), Some("Corner Boy"));
        assert!(ranks.next(2).is_none());
    }

    #[test]
    fn rejects_bad_ladders() {
        assert!(RankTable::new(vec![]).is_err());
        assert!(
            RankTable::new(vec![RankTier {
                name: "A".into(),
                threshold: Money::from_cents(1),
            }])
            .is_err()
        );
        assert!(
            RankTable::new(vec![
                RankTier {
                    name: "A".into(),
                    threshold: Money::ZERO,
                },
                RankTier {
                    name: "B".into(),
                    threshold: Money::ZERO,
                },
            ])
            .is_err()
        );
    }

    proptest! {
        #[test]
        fn rank_is_monotonic(mut totals in prop::collection::vec(0u64..100_000_000, 1..50)) {
            let ranks = ladder();
            totals.sort_unstable();
            let mut last = 0;
            for cents in totals {
                let rank = ranks.rank_for(Money::from_cents(cents));
                prop_assert!(rank >= last);
                last = rank;
            }
        }
    }
}
