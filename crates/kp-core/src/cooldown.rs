use std::hash::Hash;

use chrono::{DateTime, TimeDelta, Utc};

use crate::id::AccountKey;
use crate::store::KeyedStore;

/// When each (account, kind) pair may act again.
///
/// `C` is whatever distinguishes one cooldown from another for the same
/// player: an action kind, a substance, and so on. Missing entries mean
/// "ready now". Stale entries are never swept; comparing against the
/// current time at read time makes them harmless.
#[derive(Debug)]
pub struct CooldownRegistry<C> {
    ready_at: KeyedStore<(AccountKey, C), Option<DateTime<Utc>>>,
}

impl<C> Default for CooldownRegistry<C> {
    fn default() -> Self {
        Self {
            ready_at: KeyedStore::default(),
        }
    }
}

impl<C> CooldownRegistry<C>
where
    C: Eq + Hash + Clone,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The time after which `kind` is allowed again, if one was recorded.
    pub fn get(&self, key: AccountKey, kind: &C) -> Option<DateTime<Utc>> {
        self.ready_at
            .inspect(&(key, kind.clone()), |at| *at)
            .flatten()
    }

    /// Record when `kind` becomes available again.
    pub fn set(&self, key: AccountKey, kind: &C, at: DateTime<Utc>) {
        self.ready_at.update(&(key, kind.clone()), |slot| *slot = Some(at));
    }

    /// How long until `kind` is allowed, or `None` if it is allowed now.
    pub fn remaining(&self, key: AccountKey, kind: &C, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.get(key, kind)
            .filter(|at| now < *at)
            .map(|at| at - now)
    }

    /// Check and start a cooldown as one step.
    ///
    /// If the cooldown is still running, nothing changes and the remaining
    /// time is returned as the error. Otherwise the next allowed time is
    /// set to `now + duration` and returned.
    pub fn try_start(
        &self,
        key: AccountKey,
        kind: &C,
        now: DateTime<Utc>,
        duration: TimeDelta,
    ) -> Result<DateTime<Utc>, TimeDelta> {
        self.ready_at.update(&(key, kind.clone()), |slot| {
            if let Some(at) = slot.filter(|at| now < *at) {
                return Err(at - now);
            }
            let next = now
                .checked_add_signed(duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            *slot = Some(next);
            Ok(next)
        })
    }
}
