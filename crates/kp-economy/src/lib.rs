//! The Kingpin economy: randomized money-making actions, a contraband stash
//! that drives rank progression, passive-income properties, and snapshot
//! persistence.
//!
//! [`Economy`] is the entry point. It owns every per-player map and is
//! meant to be shared behind an `Arc` by concurrent command handlers.
//! Operations that the game rules forbid return a [`Refusal`], which is
//! expected flow rather than an error.

/// Action kinds, their tables and reports.
pub mod action;
/// Static economy configuration.
pub mod config;
/// The economy facade.
pub mod economy;
/// Configuration and persistence errors.
pub mod error;
/// Property catalog and ownership.
pub mod property;
/// Rank ladder.
pub mod rank;
/// Player-facing refusals.
pub mod refusal;
/// Rank change notifications.
pub mod role_sync;
/// Snapshot records and storage backends.
pub mod snapshot;
/// Substances, stashes and sales.
pub mod stash;

/// Re-export action types.
pub use action::{ActionConfig, ActionKind, ActionReport, ActionTables, CooldownKind};
/// Re-export configuration.
pub use config::{BUILTIN_CONFIG, EconomyConfig};
/// Re-export the facade and its views.
pub use economy::{CatalogEntry, Economy, Holding, SaleReport, StashView};
/// Re-export error types.
pub use error::{ConfigError, ConfigResult, SnapshotError, SnapshotResult};
/// Re-export property types.
pub use property::{Collection, Ownership, Portfolio, Property, Receipt};
/// Re-export rank types.
pub use rank::{RankTable, RankTier};
/// Re-export the refusal type.
pub use refusal::Refusal;
/// Re-export role sync types.
pub use role_sync::{NoRoleSync, RankChange, RoleSync};
/// Re-export snapshot types.
pub use snapshot::{
    BalanceRecord, CollectRecord, DirectoryBackend, MemoryBackend, OwnershipRecord, Snapshot,
    SnapshotBackend, SnapshotStore, StashRecord,
};
/// Re-export stash types.
pub use stash::{Production, Sale, Stash, StashEntry, Substance};
