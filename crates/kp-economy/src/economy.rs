//! The economy facade: every player-facing operation in one place.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kp_core::{AccountKey, Clock, CooldownRegistry, GroupId, Ledger, Money, PlayerId, SystemClock};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::action::{ActionKind, ActionReport, CooldownKind};
use crate::config::EconomyConfig;
use crate::error::{SnapshotError, SnapshotResult};
use crate::property::{Collection, Ownership, Portfolio, Property, Receipt};
use crate::refusal::Refusal;
use crate::role_sync::{NoRoleSync, RankChange, RoleSync};
use crate::snapshot::{
    BalanceRecord, CollectRecord, OwnershipRecord, Snapshot, SnapshotStore, StashRecord,
};
use crate::stash::{Production, Sale, Stash, StashEntry};

/// The result of selling a stash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReport {
    /// What the sale did to the stash.
    pub sale: Sale,
    /// Balance after the proceeds were credited.
    pub balance: Money,
    /// Display name of the rank after the sale.
    pub rank_name: String,
    /// Set when the sale changed the player's rank.
    pub promotion: Option<RankChange>,
}

/// One held substance, valued at catalog price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    /// Substance name.
    pub substance: String,
    /// Grams held.
    pub grams: u64,
    /// What they'd sell for.
    pub value: Money,
}

/// A player's stash as shown to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashView {
    /// Held substances, by name.
    pub holdings: Vec<Holding>,
    /// Total sale value of the stash.
    pub total_value: Money,
    /// Current rank index.
    pub rank: usize,
    /// Current rank name.
    pub rank_name: String,
    /// Lifetime sales proceeds.
    pub lifetime_proceeds: Money,
    /// The next rank's name and the proceeds still needed to reach it.
    pub next_rank: Option<(String, Money)>,
}

/// A catalog row, marked with whether the player owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    /// Catalog index.
    pub index: usize,
    /// The property.
    pub property: &'a Property,
    /// Whether the player already owns it.
    pub owned: bool,
}

/// All economy state plus the configuration that governs it.
///
/// Safe to share between threads behind an `Arc`. Every operation locks
/// only the entries of the player it acts on.
pub struct Economy {
    config: Arc<EconomyConfig>,
    ledger: Ledger,
    cooldowns: CooldownRegistry<CooldownKind>,
    stash: Stash,
    portfolio: Portfolio,
    clock: Arc<dyn Clock>,
    role_sync: Arc<dyn RoleSync>,
    store: Option<SnapshotStore>,
}

impl std::fmt::Debug for Economy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Economy")
            .field("ledger", &self.ledger)
            .field("stash", &self.stash)
            .field("portfolio", &self.portfolio)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Economy {
    /// An empty economy on the system clock, without persistence.
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config: Arc::new(config),
            ledger: Ledger::new(),
            cooldowns: CooldownRegistry::new(),
            stash: Stash::new(),
            portfolio: Portfolio::new(),
            clock: Arc::new(SystemClock),
            role_sync: Arc::new(NoRoleSync),
            store: None,
        }
    }

    /// Use a different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Notify `role_sync` of rank changes.
    pub fn with_role_sync(mut self, role_sync: Arc<dyn RoleSync>) -> Self {
        self.role_sync = role_sync;
        self
    }

    /// Persist to `store` on [`Economy::save_all`].
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// The balance ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run an action with an unpredictable roll.
    pub fn perform(&self, key: AccountKey, kind: ActionKind) -> Result<ActionReport, Refusal> {
        self.perform_with(key, kind, &mut rand::rng())
    }

    /// Run an action: start its cooldown, roll its table, apply the delta.
    ///
    /// A refused action changes nothing. A loss larger than the balance
    /// leaves zero, and `applied` reports what actually came off.
    pub fn perform_with<R: Rng + ?Sized>(
        &self,
        key: AccountKey,
        kind: ActionKind,
        rng: &mut R,
    ) -> Result<ActionReport, Refusal> {
        let action = self.config.action(kind);
        let next_allowed = self
            .cooldowns
            .try_start(key, &CooldownKind::Action(kind), self.now(), action.cooldown())
            .map_err(|remaining| Refusal::Cooldown { remaining })?;

        let roll = action.table.roll(rng);
        let change = self.ledger.apply(key, roll.delta);
        debug!(%key, %kind, rolled = %roll.delta, applied = %change.applied(), "action resolved");

        Ok(ActionReport {
            kind,
            message: roll.message,
            rolled: roll.delta,
            applied: change.applied(),
            balance: change.after,
            next_allowed,
        })
    }

    /// Current balance.
    pub fn balance(&self, key: AccountKey) -> Money {
        self.ledger.get_balance(key)
    }

    /// Produce a substance by name.
    pub fn produce(&self, key: AccountKey, substance: &str) -> Result<Production, Refusal> {
        let substance = self
            .config
            .substance(substance)
            .ok_or_else(|| Refusal::UnknownSubstance(substance.trim().to_string()))?;
        let made = self.stash.produce(
            key,
            substance,
            &self.config.ranks,
            &self.cooldowns,
            self.now(),
            &mut rand::rng(),
        )?;
        debug!(%key, substance = %made.substance, grams = made.grams, "produced");
        Ok(made)
    }

    /// Sell the whole stash, credit the proceeds, and recompute rank.
    ///
    /// A rank change is reported to the role sync after all locks are
    /// released.
    pub fn sell_all(&self, key: AccountKey) -> SaleReport {
        let ranks = &self.config.ranks;
        let (sale, balance) = self
            .stash
            .sell_all(key, &self.config.substances, ranks, &self.ledger);
        let rank_name = ranks.name(sale.rank).to_string();

        let promotion = (sale.rank != sale.previous_rank).then(|| RankChange {
            key,
            previous: sale.previous_rank,
            rank: sale.rank,
            rank_name: rank_name.clone(),
        });
        if let Some(change) = &promotion {
            info!(%key, rank = %change.rank_name, "player promoted");
            self.role_sync.rank_changed(change);
        }
        debug!(%key, grams = sale.grams, proceeds = %sale.proceeds, "stash sold");

        SaleReport {
            sale,
            balance,
            rank_name,
            promotion,
        }
    }

    /// The player's stash, valued, with progress towards the next rank.
    pub fn stash(&self, key: AccountKey) -> StashView {
        let entry = self.stash.peek(key);
        let ranks = &self.config.ranks;
        let holdings: Vec<Holding> = entry
            .quantities()
            .iter()
            .map(|(name, grams)| Holding {
                substance: name.clone(),
                grams: *grams,
                value: self
                    .config
                    .substance(name)
                    .map_or(Money::ZERO, |s| s.price_per_gram.times(*grams)),
            })
            .collect();
        let next_rank = ranks.next(entry.rank()).map(|tier| {
            (
                tier.name.clone(),
                tier.threshold.saturating_sub(entry.lifetime_proceeds()),
            )
        });

        StashView {
            total_value: holdings.iter().map(|h| h.value).sum(),
            holdings,
            rank: entry.rank(),
            rank_name: ranks.name(entry.rank()).to_string(),
            lifetime_proceeds: entry.lifetime_proceeds(),
            next_rank,
        }
    }

    /// Buy a property by catalog index.
    pub fn purchase_property(&self, key: AccountKey, index: usize) -> Result<Receipt, Refusal> {
        let receipt = self
            .portfolio
            .purchase(&self.config.properties, &self.ledger, key, index)?;
        info!(%key, property = %receipt.name, price = %receipt.price, "property bought");
        Ok(receipt)
    }

    /// Collect income from every owned property.
    pub fn collect(&self, key: AccountKey) -> Result<Collection, Refusal> {
        let got = self.portfolio.collect(
            &self.config.properties,
            &self.ledger,
            key,
            self.now(),
            self.config.collect_interval(),
        )?;
        debug!(%key, amount = %got.amount, properties = got.properties, "income collected");
        Ok(got)
    }

    /// Owned properties, by ascending catalog index.
    pub fn list_owned(&self, key: AccountKey) -> Vec<(usize, &Property)> {
        self.portfolio.list_owned(&self.config.properties, key)
    }

    /// The whole catalog, marked with what the player owns.
    pub fn catalog(&self, key: AccountKey) -> Vec<CatalogEntry<'_>> {
        self.config
            .properties
            .iter()
            .enumerate()
            .map(|(index, property)| CatalogEntry {
                index,
                property,
                owned: self.portfolio.owns(key, index),
            })
            .collect()
    }

    /// The richest players of a group.
    pub fn leaderboard(&self, group: GroupId, limit: usize) -> Vec<(PlayerId, Money)> {
        self.ledger.top(group, limit)
    }

    /// Copy every map into a snapshot.
    ///
    /// Accounts are copied one at a time. Each account's holding, stash
    /// and balance are locked together, in the order purchases and sales
    /// take them (holding, stash, ledger), so no half-applied purchase or
    /// sale ends up in the copy. Holding and stash entries are created for
    /// accounts that lack them so there is always a lock to take; empty
    /// ones are left out of the snapshot. There is never a moment where
    /// every account is frozen at once.
    pub fn snapshot(&self) -> Snapshot {
        let accounts: BTreeSet<AccountKey> = self
            .portfolio
            .keys()
            .into_iter()
            .chain(self.stash.keys())
            .chain(self.ledger.keys())
            .collect();

        let mut snapshot = Snapshot::default();
        for key in accounts {
            self.portfolio.with_holding(key, |holding| {
                self.stash.with_entry(key, |stash| {
                    let balance = self.ledger.peek(key);
                    record_account(&mut snapshot, key, holding, stash, balance);
                })
            });
        }
        snapshot
    }

    /// Replace every map with the contents of `snapshot`.
    ///
    /// Ranks are reconciled with the current ladder and property indices
    /// that no longer exist in the catalog are dropped.
    pub fn restore(&self, snapshot: Snapshot) {
        let key = |group: GroupId, player: PlayerId| AccountKey { group, player };

        self.ledger.restore(
            snapshot
                .balances
                .into_iter()
                .map(|r| (key(r.group, r.player), r.balance)),
        );

        let ranks = &self.config.ranks;
        self.stash.restore(snapshot.stashes.into_iter().map(|r| {
            let entry = StashEntry::from_parts(r.quantities, r.rank, r.lifetime_proceeds, ranks);
            (key(r.group, r.player), entry)
        }));

        let catalog_len = self.config.properties.len();
        let mut holdings: BTreeMap<AccountKey, Ownership> = BTreeMap::new();
        for record in snapshot.ownership {
            let account = key(record.group, record.player);
            let holding = holdings.entry(account).or_default();
            for index in record.properties {
                if index < catalog_len {
                    holding.owned.insert(index);
                } else {
                    warn!(%account, index, "dropping unknown property from snapshot");
                }
            }
        }
        for record in snapshot.collections {
            holdings
                .entry(key(record.group, record.player))
                .or_default()
                .next_collect = Some(record.next_collect);
        }
        self.portfolio.restore(holdings);
    }

    /// Load the last snapshot from the store, if one is configured.
    ///
    /// On failure the in-memory state is left untouched.
    pub fn load_all(&self) -> SnapshotResult<()> {
        let Some(store) = &self.store else {
            debug!("no snapshot store configured, starting empty");
            return Ok(());
        };
        let snapshot = store.load()?;
        info!(
            balances = snapshot.balances.len(),
            stashes = snapshot.stashes.len(),
            owners = snapshot.ownership.len(),
            "snapshot loaded"
        );
        self.restore(snapshot);
        Ok(())
    }

    /// Write a full snapshot to the store, if one is configured.
    ///
    /// Overlapping saves run one after another, each taking its snapshot
    /// when its turn comes, so the newest state is the one left on disk.
    pub fn save_all(&self) -> SnapshotResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        store.save_with(|| self.snapshot())?;
        debug!("snapshot saved");
        Ok(())
    }

    /// Save on a blocking worker without holding up the caller.
    ///
    /// The returned handle resolves to the save's outcome, or a timeout
    /// error if it takes longer than `timeout`. Failures are also logged.
    /// Must be called from within a Tokio runtime.
    pub fn spawn_save(
        self: &Arc<Self>,
        timeout: Duration,
    ) -> tokio::task::JoinHandle<SnapshotResult<()>> {
        let economy = Arc::clone(self);
        tokio::spawn(async move {
            let task = tokio::task::spawn_blocking(move || economy.save_all());
            let result = match tokio::time::timeout(timeout, task).await {
                Ok(Ok(saved)) => saved,
                Ok(Err(join)) => Err(SnapshotError::Task(join.to_string())),
                Err(_) => Err(SnapshotError::Timeout(timeout)),
            };
            if let Err(e) = &result {
                warn!(error = %e, "background snapshot save failed");
            }
            result
        })
    }
}

fn record_account(
    snapshot: &mut Snapshot,
    key: AccountKey,
    holding: &Ownership,
    stash: &StashEntry,
    balance: Option<Money>,
) {
    let AccountKey { group, player } = key;
    if let Some(balance) = balance {
        snapshot.balances.push(BalanceRecord {
            group,
            player,
            balance,
        });
    }
    if *stash != StashEntry::default() {
        snapshot.stashes.push(StashRecord {
            group,
            player,
            quantities: stash.quantities().clone(),
            rank: stash.rank(),
            lifetime_proceeds: stash.lifetime_proceeds(),
        });
    }
    if !holding.owned.is_empty() {
        snapshot.ownership.push(OwnershipRecord {
            group,
            player,
            properties: holding.owned.iter().copied().collect(),
        });
    }
    if let Some(next_collect) = holding.next_collect {
        snapshot.collections.push(CollectRecord {
            group,
            player,
            next_collect,
        });
    }
}
