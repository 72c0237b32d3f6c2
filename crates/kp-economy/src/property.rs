//! Passive-income properties: the shared catalog and per-player ownership.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use kp_core::{AccountKey, KeyedStore, Ledger, Money};
use serde::{Deserialize, Serialize};

use crate::refusal::Refusal;

/// A purchasable catalog item. Its index in the catalog is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Display name.
    pub name: String,
    /// Purchase price.
    #[serde(rename = "price_cents")]
    pub price: Money,
    /// Income paid per collection.
    #[serde(rename = "collect_cents")]
    pub collect_amount: Money,
}

/// One player's properties and their shared collection timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ownership {
    /// Owned catalog indices.
    pub owned: BTreeSet<usize>,
    /// Earliest time income can be collected again. `None` means now.
    pub next_collect: Option<DateTime<Utc>>,
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Catalog index bought.
    pub index: usize,
    /// Name of the property.
    pub name: String,
    /// What it cost.
    pub price: Money,
    /// Balance afterwards.
    pub balance: Money,
}

/// A completed income collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Total income credited.
    pub amount: Money,
    /// How many properties paid out.
    pub properties: usize,
    /// Balance afterwards.
    pub balance: Money,
    /// When income can be collected again.
    pub next_collect: DateTime<Utc>,
}

/// Every player's property holdings.
#[derive(Debug, Default)]
pub struct Portfolio {
    holdings: KeyedStore<AccountKey, Ownership>,
}

impl Portfolio {
    /// Create an empty portfolio book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buy the property at `index`.
    ///
    /// The ownership entry stays locked while the ledger is checked and
    /// debited, so either both the debit and the grant land or neither does.
    pub fn purchase(
        &self,
        catalog: &[Property],
        ledger: &Ledger,
        key: AccountKey,
        index: usize,
    ) -> Result<Receipt, Refusal> {
        let property = catalog.get(index).ok_or(Refusal::UnknownProperty(index))?;
        self.holdings.update(&key, |holding| {
            if holding.owned.contains(&index) {
                return Err(Refusal::AlreadyOwned(property.name.clone()));
            }
            let balance = ledger.with_balance(key, |balance| {
                let remaining =
                    balance
                        .checked_sub(property.price)
                        .ok_or(Refusal::InsufficientFunds {
                            needed: property.price,
                            balance: *balance,
                        })?;
                *balance = remaining;
                Ok(remaining)
            })?;
            holding.owned.insert(index);
            Ok(Receipt {
                index,
                name: property.name.clone(),
                price: property.price,
                balance,
            })
        })
    }

    /// Collect income from every owned property.
    ///
    /// Refused while the shared timer is running, and when nothing is owned
    /// (the timer is left alone in that case).
    pub fn collect(
        &self,
        catalog: &[Property],
        ledger: &Ledger,
        key: AccountKey,
        now: DateTime<Utc>,
        interval: TimeDelta,
    ) -> Result<Collection, Refusal> {
        self.holdings.update(&key, |holding| {
            if let Some(at) = holding.next_collect.filter(|at| now < *at) {
                return Err(Refusal::Cooldown {
                    remaining: at - now,
                });
            }
            if holding.owned.is_empty() {
                return Err(Refusal::NoProperties);
            }
            let amount: Money = holding
                .owned
                .iter()
                .filter_map(|i| catalog.get(*i))
                .map(|p| p.collect_amount)
                .sum();
            let balance = ledger.add_to_balance(key, amount);
            let next_collect = now
                .checked_add_signed(interval)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            holding.next_collect = Some(next_collect);
            Ok(Collection {
                amount,
                properties: holding.owned.len(),
                balance,
                next_collect,
            })
        })
    }

    /// Owned properties, by ascending catalog index.
    pub fn list_owned<'a>(&self, catalog: &'a [Property], key: AccountKey) -> Vec<(usize, &'a Property)> {
        self.holdings
            .inspect(&key, |holding| {
                holding
                    .owned
                    .iter()
                    .filter_map(|i| catalog.get(*i).map(|p| (*i, p)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the player owns the property at `index`.
    pub fn owns(&self, key: AccountKey, index: usize) -> bool {
        self.holdings
            .inspect(&key, |holding| holding.owned.contains(&index))
            .unwrap_or(false)
    }

    /// Run `f` with the player's holding locked, creating an empty one if needed.
    pub fn with_holding<R>(&self, key: AccountKey, f: impl FnOnce(&Ownership) -> R) -> R {
        self.holdings.update(&key, |holding| f(holding))
    }

    /// Every account with a holding.
    pub fn keys(&self) -> Vec<AccountKey> {
        self.holdings.keys()
    }

    /// Replace every holding.
    pub fn restore(&self, holdings: impl IntoIterator<Item = (AccountKey, Ownership)>) {
        self.holdings.replace_all(holdings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: AccountKey = AccountKey::new(7, 42);

    fn catalog() -> Vec<Property> {
        vec![
            Property {
                name: "Food Truck".into(),
                price: Money::from_dollars(100),
                collect_amount: Money::from_dollars(10),
            },
            Property {
                name: "Laundromat".into(),
                price: Money::from_dollars(1_000),
                collect_amount: Money::from_dollars(25),
            },
        ]
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[test]
    fn purchase_debits_and_grants_once() {
        let portfolio = Portfolio::new();
        let ledger = Ledger::new();
        ledger.add_to_balance(KEY, Money::from_dollars(150));

        let receipt = portfolio.purchase(&catalog(), &ledger, KEY, 0).unwrap();
        assert_eq!(receipt.balance, Money::from_dollars(50));
        assert_eq!(ledger.get_balance(KEY), Money::from_dollars(50));
        assert!(portfolio.owns(KEY, 0));

        let again = portfolio.purchase(&catalog(), &ledger, KEY, 0);
        assert_eq!(again, Err(Refusal::AlreadyOwned("Food Truck".into())));
        assert_eq!(ledger.get_balance(KEY), Money::from_dollars(50));
        assert_eq!(portfolio.list_owned(&catalog(), KEY).len(), 1);
    }

    #[test]
    fn failed_purchase_changes_nothing() {
        let portfolio = Portfolio::new();
        let ledger = Ledger::new();
        ledger.add_to_balance(KEY, Money::from_dollars(999));

        let refused = portfolio.purchase(&catalog(), &ledger, KEY, 1);
        assert_eq!(
            refused,
            Err(Refusal::InsufficientFunds {
                needed: Money::from_dollars(1_000),
                balance: Money::from_dollars(999),
            })
        );
        assert_eq!(ledger.get_balance(KEY), Money::from_dollars(999));
        assert!(!portfolio.owns(KEY, 1));
    }

    #[test]
    fn unknown_index_is_refused() {
        let portfolio = Portfolio::new();
        let ledger = Ledger::new();
        assert_eq!(
            portfolio.purchase(&catalog(), &ledger, KEY, 5),
            Err(Refusal::UnknownProperty(5))
        );
    }

    #[test]
    fn concurrent_purchases_grant_once_and_debit_once() {
        let portfolio = Portfolio::new();
        let ledger = Ledger::new();
        ledger.add_to_balance(KEY, Money::from_dollars(500));
        let catalog = catalog();

        let wins: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| portfolio.purchase(&catalog, &ledger, KEY, 0).is_ok()))
                .collect();
            handles.into_iter().map(|h| usize::from(h.join().unwrap())).sum()
        });
        assert_eq!(wins, 1);
        assert_eq!(ledger.get_balance(KEY), Money::from_dollars(400));
    }

    #[test]
    fn collect_pays_and_starts_timer() {
        let portfolio = Portfolio::new();
        let ledger = Ledger::new();
        ledger.add_to_balance(KEY, Money::from_dollars(1_100));
        portfolio.purchase(&catalog(), &ledger, KEY, 0).unwrap();
        portfolio.purchase(&catalog(), &ledger, KEY, 1).unwrap();
        assert_eq!(ledger.get_balance(KEY), Money::ZERO);

        let day = TimeDelta::days(1);
        let got = portfolio
            .collect(&catalog(), &ledger, KEY, t0(), day)
            .unwrap();
        assert_eq!(got.amount, Money::from_dollars(35));
        assert_eq!(got.properties, 2);
        assert_eq!(got.next_collect, t0() + day);

        let early = portfolio.collect(&catalog(), &ledger, KEY, t0() + TimeDelta::hours(23), day);
        assert_eq!(
            early,
            Err(Refusal::Cooldown {
                remaining: TimeDelta::hours(1)
            })
        );

        let later = portfolio.collect(&catalog(), &ledger, KEY, t0() + day, day);
        assert!(later.is_ok());
        assert_eq!(ledger.get_balance(KEY), Money::from_dollars(70));
    }

    #[test]
    fn collect_without_properties_keeps_timer_idle() {
        let portfolio = Portfolio::new();
        let ledger = Ledger::new();
        let refused = portfolio.collect(&catalog(), &ledger, KEY, t0(), TimeDelta::days(1));
        assert_eq!(refused, Err(Refusal::NoProperties));
        assert_eq!(portfolio.keys(), vec![KEY]);
        assert_eq!(portfolio.with_holding(KEY, Ownership::clone), Ownership::default());
    }

    #[test]
    fn list_owned_is_ordered_by_index() {
        let portfolio = Portfolio::new();
        portfolio.restore([(
            KEY,
            Ownership {
                owned: [1, 0].into_iter().collect(),
                next_collect: None,
            },
        )]);
        let catalog = catalog();
        let names: Vec<_> = portfolio
            .list_owned(&catalog, KEY)
            .into_iter()
            .map(|(_, p)| p.name.as_str())
            .collect();
        assert_eq!(names, ["Food Truck", "Laundromat"]);
    }
}
