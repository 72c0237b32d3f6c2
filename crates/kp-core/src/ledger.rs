use crate::id::{AccountKey, GroupId, PlayerId};
use crate::money::{Delta, Money};
use crate::store::KeyedStore;

/// Before/after balances of one ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    /// Balance before the mutation.
    pub before: Money,
    /// Balance after the mutation.
    pub after: Money,
}

impl BalanceChange {
    /// The change that actually landed, after clamping at zero.
    pub fn applied(&self) -> Delta {
        Delta::between(self.before, self.after)
    }
}

/// Cash balances per (group, player).
///
/// Every mutation of one account happens under that account's lock, so
/// concurrent adds and subtracts never lose an update. Balances can't go
/// negative: subtracting more than what's there leaves zero.
#[derive(Debug, Default)]
pub struct Ledger {
    balances: KeyedStore<AccountKey, Money>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance. Unknown accounts have zero and are not created.
    pub fn get_balance(&self, key: AccountKey) -> Money {
        self.balances.inspect(&key, |b| *b).unwrap_or_default()
    }

    /// Credit an account. Returns the new balance.
    pub fn add_to_balance(&self, key: AccountKey, amount: Money) -> Money {
        self.balances.update(&key, |b| {
            *b = b.saturating_add(amount);
            *b
        })
    }

    /// Debit an account, clamping at zero. Returns the new balance.
    pub fn subtract_from_balance(&self, key: AccountKey, amount: Money) -> Money {
        self.balances.update(&key, |b| {
            *b = b.saturating_sub(amount);
            *b
        })
    }

    /// Apply a signed delta in one step.
    pub fn apply(&self, key: AccountKey, delta: Delta) -> BalanceChange {
        self.balances.update(&key, |b| {
            let before = *b;
            *b = before.apply(delta);
            BalanceChange { before, after: *b }
        })
    }

    /// Run `f` with the account's balance locked.
    ///
    /// Used for compound operations (check-then-debit) that must not
    /// interleave with other mutations of the same account.
    pub fn with_balance<R>(&self, key: AccountKey, f: impl FnOnce(&mut Money) -> R) -> R {
        self.balances.update(&key, f)
    }

    /// The richest players in a group, highest balance first.
    ///
    /// Ties are broken by player id so the order is stable.
    pub fn top(&self, group: GroupId, limit: usize) -> Vec<(PlayerId, Money)> {
        let mut rows = self.balances.collect(|key, balance| {
            (key.group == group && !balance.is_zero()).then_some((key.player, *balance))
        });
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.truncate(limit);
        rows
    }

    /// Balance of an account that has one, `None` for unseen accounts.
    pub fn peek(&self, key: AccountKey) -> Option<Money> {
        self.balances.inspect(&key, |b| *b)
    }

    /// Every account with a ledger entry.
    pub fn keys(&self) -> Vec<AccountKey> {
        self.balances.keys()
    }

    /// Replace every balance.
    pub fn restore(&self, balances: impl IntoIterator<Item = (AccountKey, Money)>) {
        self.balances.replace_all(balances);
    }
}
