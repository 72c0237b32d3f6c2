//! Contraband inventory, sales, and rank progression.
//!
//! Each player has one [`StashEntry`] per group holding grams per
//! substance, lifetime sales proceeds, and the rank those proceeds earn.
//! Rank is recomputed from proceeds on every sale and never goes down.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use kp_core::{AccountKey, CooldownRegistry, KeyedStore, Ledger, Money};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::CooldownKind;
use crate::config::secs;
use crate::rank::RankTable;
use crate::refusal::Refusal;

/// A producible, sellable substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substance {
    /// Name, unique within the catalog.
    pub name: String,
    /// Sale price per gram.
    #[serde(rename = "price_per_gram_cents")]
    pub price_per_gram: Money,
    /// Minimum rank index needed to produce it.
    pub min_rank: usize,
    /// Seconds between productions.
    pub cooldown_secs: u64,
    /// Fewest grams one production yields.
    pub yield_min: u64,
    /// Most grams one production yields.
    pub yield_max: u64,
}

impl Substance {
    /// Time between productions.
    pub fn cooldown(&self) -> TimeDelta {
        secs(self.cooldown_secs)
    }
}

/// One player's stash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashEntry {
    quantities: BTreeMap<String, u64>,
    rank: usize,
    lifetime_proceeds: Money,
}

/// What a sale did to a stash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    /// Grams sold across all substances.
    pub grams: u64,
    /// Money earned by this sale.
    pub proceeds: Money,
    /// Lifetime proceeds after the sale.
    pub lifetime_proceeds: Money,
    /// Rank before the sale.
    pub previous_rank: usize,
    /// Rank after the sale.
    pub rank: usize,
}

impl Sale {
    /// Whether the sale moved the player up a rank.
    pub fn promoted(&self) -> bool {
        self.rank > self.previous_rank
    }
}

/// The result of a successful production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    /// What was produced.
    pub substance: String,
    /// Grams produced this time.
    pub grams: u64,
    /// Grams of this substance now in the stash.
    pub total: u64,
    /// When this substance can be produced again.
    pub next_allowed: DateTime<Utc>,
}

impl StashEntry {
    /// Rebuild an entry from persisted parts.
    ///
    /// The stored rank is kept if it is higher than what the proceeds earn
    /// under the current ladder, so a reload never demotes anyone.
    pub fn from_parts(
        quantities: BTreeMap<String, u64>,
        rank: usize,
        lifetime_proceeds: Money,
        ranks: &RankTable,
    ) -> Self {
        let top = ranks.len().saturating_sub(1);
        Self {
            quantities: quantities.into_iter().filter(|(_, g)| *g > 0).collect(),
            rank: rank.max(ranks.rank_for(lifetime_proceeds)).min(top),
            lifetime_proceeds,
        }
    }

    /// Grams held of one substance.
    pub fn quantity(&self, substance: &str) -> u64 {
        self.quantities.get(substance).copied().unwrap_or(0)
    }

    /// Grams held, by substance.
    pub fn quantities(&self) -> &BTreeMap<String, u64> {
        &self.quantities
    }

    /// Current rank index.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Everything this player has ever earned from sales.
    pub fn lifetime_proceeds(&self) -> Money {
        self.lifetime_proceeds
    }

    /// Total grams across all substances.
    pub fn total_grams(&self) -> u64 {
        self.quantities.values().sum()
    }

    /// Add grams of a substance. Returns the new quantity.
    pub fn add_amount_to_type(&mut self, substance: &str, grams: u64) -> u64 {
        if grams == 0 {
            return self.quantity(substance);
        }
        let held = self.quantities.entry(substance.to_string()).or_insert(0);
        *held = held.saturating_add(grams);
        *held
    }

    /// What the stash would sell for right now.
    pub fn value(&self, substances: &[Substance]) -> Money {
        self.quantities
            .iter()
            .map(|(name, grams)| price_of(substances, name).times(*grams))
            .sum()
    }

    /// Sell everything at catalog prices.
    ///
    /// Quantities go to zero, proceeds are added to the lifetime total and
    /// the rank is recomputed. Substances missing from the catalog sell for
    /// nothing but are still cleared.
    pub fn sell_all(&mut self, substances: &[Substance], ranks: &RankTable) -> Sale {
        let proceeds = self.value(substances);
        let grams = self.total_grams();
        self.quantities.clear();

        let previous_rank = self.rank;
        self.lifetime_proceeds = self.lifetime_proceeds.saturating_add(proceeds);
        self.rank = self.rank.max(ranks.rank_for(self.lifetime_proceeds));

        Sale {
            grams,
            proceeds,
            lifetime_proceeds: self.lifetime_proceeds,
            previous_rank,
            rank: self.rank,
        }
    }
}

fn price_of(substances: &[Substance], name: &str) -> Money {
    substances
        .iter()
        .find(|s| s.name == name)
        .map_or(Money::ZERO, |s| s.price_per_gram)
}

/// Every player's stash.
#[derive(Debug, Default)]
pub struct Stash {
    entries: KeyedStore<AccountKey, StashEntry>,
}

impl Stash {
    /// Create an empty stash book.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the player's stash, creating an empty one on first access.
    pub fn get_stash(&self, key: AccountKey) -> StashEntry {
        self.entries.update(&key, |entry| entry.clone())
    }

    /// A copy of the player's stash without creating one.
    pub fn peek(&self, key: AccountKey) -> StashEntry {
        self.entries
            .inspect(&key, StashEntry::clone)
            .unwrap_or_default()
    }

    /// Add grams of a substance to a player's stash. Returns the new quantity.
    pub fn add_amount_to_type(&self, key: AccountKey, substance: &str, grams: u64) -> u64 {
        self.entries
            .update(&key, |entry| entry.add_amount_to_type(substance, grams))
    }

    /// Produce a substance: rank gate, cooldown, then a random yield.
    ///
    /// The rank check runs before the cooldown starts, so a refused attempt
    /// changes nothing. Lock order: stash entry, then cooldown entry.
    pub fn produce<R: Rng + ?Sized>(
        &self,
        key: AccountKey,
        substance: &Substance,
        ranks: &RankTable,
        cooldowns: &CooldownRegistry<CooldownKind>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Production, Refusal> {
        self.entries.update(&key, |entry| {
            if entry.rank < substance.min_rank {
                return Err(Refusal::RankTooLow {
                    substance: substance.name.clone(),
                    required: ranks.name(substance.min_rank).to_string(),
                    current: ranks.name(entry.rank).to_string(),
                });
            }
            let kind = CooldownKind::Produce(substance.name.clone());
            let next_allowed = cooldowns
                .try_start(key, &kind, now, substance.cooldown())
                .map_err(|remaining| Refusal::Cooldown { remaining })?;

            let grams = if substance.yield_min <= substance.yield_max {
                rng.random_range(substance.yield_min..=substance.yield_max)
            } else {
                substance.yield_min
            };
            let total = entry.add_amount_to_type(&substance.name, grams);
            Ok(Production {
                substance: substance.name.clone(),
                grams,
                total,
                next_allowed,
            })
        })
    }

    /// Sell the whole stash and credit the proceeds.
    ///
    /// Clearing the inventory, crediting the ledger, and recomputing the
    /// rank happen while the stash entry is locked. Lock order: stash
    /// entry, then ledger entry. Returns the sale and the new balance.
    pub fn sell_all(
        &self,
        key: AccountKey,
        substances: &[Substance],
        ranks: &RankTable,
        ledger: &Ledger,
    ) -> (Sale, Money) {
        self.entries.update(&key, |entry| {
            let sale = entry.sell_all(substances, ranks);
            let balance = if sale.proceeds.is_zero() {
                ledger.get_balance(key)
            } else {
                ledger.add_to_balance(key, sale.proceeds)
            };
            (sale, balance)
        })
    }

    /// Run `f` with the player's stash locked, creating an empty one if needed.
    pub fn with_entry<R>(&self, key: AccountKey, f: impl FnOnce(&StashEntry) -> R) -> R {
        self.entries.update(&key, |entry| f(entry))
    }

    /// Every account with a stash.
    pub fn keys(&self) -> Vec<AccountKey> {
        self.entries.keys()
    }

    /// Replace every stash.
    pub fn restore(&self, entries: impl IntoIterator<Item = (AccountKey, StashEntry)>) {
        self.entries.replace_all(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::RankTier;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const KEY: AccountKey = AccountKey::new(1, 1);

    fn substances() -> Vec<Substance> {
        vec![
            Substance {
                name: "weed".into(),
                price_per_gram: Money::from_dollars(10),
                min_rank: 0,
                cooldown_secs: 300,
                yield_min: 5,
                yield_max: 15,
            },
            Substance {
                name: "coke".into(),
                price_per_gram: Money::from_dollars(80),
                min_rank: 1,
                cooldown_secs: 600,
                yield_min: 1,
                yield_max: 5,
            },
        ]
    }

    fn ranks() -> RankTable {
        RankTable::new(vec![
            RankTier {
                name: "Nobody".into(),
                threshold: Money::ZERO,
            },
            RankTier {
                name: "Dealer".into(),
                threshold: Money::from_dollars(100),
            },
            RankTier {
                name: "Kingpin".into(),
                threshold: Money::from_dollars(1_000),
            },
        ])
        .unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[test]
    fn add_amount_accumulates() {
        let mut entry = StashEntry::default();
        assert_eq!(entry.add_amount_to_type("weed", 4), 4);
        assert_eq!(entry.add_amount_to_type("weed", 6), 10);
        assert_eq!(entry.add_amount_to_type("weed", 0), 10);
        assert_eq!(entry.total_grams(), 10);
    }

    #[test]
    fn sell_all_twice_yields_nothing_the_second_time() {
        let mut entry = StashEntry::default();
        entry.add_amount_to_type("weed", 3);
        entry.add_amount_to_type("coke", 1);

        let first = entry.sell_all(&substances(), &ranks());
        assert_eq!(first.proceeds, Money::from_dollars(110));
        assert_eq!(first.grams, 4);
        assert_eq!(entry.total_grams(), 0);

        let second = entry.sell_all(&substances(), &ranks());
        assert_eq!(second.proceeds, Money::ZERO);
        assert_eq!(second.lifetime_proceeds, first.lifetime_proceeds);
    }

    #[test]
    fn exact_threshold_promotes() {
        let mut entry = StashEntry::default();
        entry.add_amount_to_type("weed", 10);
        let sale = entry.sell_all(&substances(), &ranks());
        assert_eq!(sale.lifetime_proceeds, Money::from_dollars(100));
        assert_eq!(sale.previous_rank, 0);
        assert_eq!(sale.rank, 1);
        assert!(sale.promoted());
    }

    #[test]
    fn unknown_substance_is_cleared_for_nothing() {
        let mut entry = StashEntry::default();
        entry.add_amount_to_type("moonshine", 5);
        let sale = entry.sell_all(&substances(), &ranks());
        assert_eq!(sale.proceeds, Money::ZERO);
        assert_eq!(sale.grams, 5);
        assert_eq!(entry.total_grams(), 0);
    }

    #[test]
    fn from_parts_never_demotes() {
        let entry = StashEntry::from_parts(BTreeMap::new(), 2, Money::from_dollars(5), &ranks());
        assert_eq!(entry.rank(), 2);
        let entry = StashEntry::from_parts(BTreeMap::new(), 0, Money::from_dollars(150), &ranks());
        assert_eq!(entry.rank(), 1);
        let entry = StashEntry::from_parts(BTreeMap::new(), 99, Money::ZERO, &ranks());
        assert_eq!(entry.rank(), 2);
    }

    #[test]
    fn produce_respects_rank_gate_without_side_effects() {
        let stash = Stash::new();
        let cooldowns = CooldownRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);
        let coke = &substances()[1];

        let refused = stash.produce(KEY, coke, &ranks(), &cooldowns, t0(), &mut rng);
        assert!(matches!(refused, Err(Refusal::RankTooLow { .. })));
        assert_eq!(stash.peek(KEY).total_grams(), 0);
        assert_eq!(
            cooldowns.get(KEY, &CooldownKind::Produce("coke".into())),
            None
        );
    }

    #[test]
    fn produce_then_cooldown() {
        let stash = Stash::new();
        let cooldowns = CooldownRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);
        let weed = &substances()[0];

        let made = stash
            .produce(KEY, weed, &ranks(), &cooldowns, t0(), &mut rng)
            .unwrap();
        assert!((5..=15).contains(&made.grams));
        assert_eq!(made.total, made.grams);
        assert_eq!(made.next_allowed, t0() + TimeDelta::seconds(300));

        let again = stash.produce(KEY, weed, &ranks(), &cooldowns, t0(), &mut rng);
        assert_eq!(
            again,
            Err(Refusal::Cooldown {
                remaining: TimeDelta::seconds(300)
            })
        );
        assert_eq!(stash.peek(KEY).quantity("weed"), made.grams);
    }

    #[test]
    fn sell_credits_ledger() {
        let stash = Stash::new();
        let ledger = Ledger::new();
        assert_eq!(stash.add_amount_to_type(KEY, "weed", 7), 7);

        let (sale, balance) = stash.sell_all(KEY, &substances(), &ranks(), &ledger);
        assert_eq!(sale.proceeds, Money::from_dollars(70));
        assert_eq!(balance, Money::from_dollars(70));
        assert_eq!(ledger.get_balance(KEY), Money::from_dollars(70));
        assert_eq!(stash.get_stash(KEY).lifetime_proceeds(), Money::from_dollars(70));
    }

    #[test]
    fn get_stash_creates_entry() {
        let stash = Stash::new();
        assert!(stash.keys().is_empty());
        let entry = stash.get_stash(KEY);
        assert_eq!(entry, StashEntry::default());
        assert_eq!(stash.keys(), vec![KEY]);
        assert_eq!(stash.with_entry(KEY, StashEntry::total_grams), 0);
    }
}
