//! Core types for Kingpin: money, account keys, clocks, and the per-player
//! ledger and cooldown maps.
//!
//! Everything here is safe to share between threads. Per-player state lives
//! in a [`KeyedStore`], which locks each entry on its own so that unrelated
//! players never wait on each other.

/// Clock abstraction and duration formatting.
pub mod clock;
/// Per-(player, kind) cooldown timestamps.
pub mod cooldown;
/// Group, player, and account identifiers.
pub mod id;
/// Per-account cash balances with a floor at zero.
pub mod ledger;
/// Fixed-point money amounts.
pub mod money;
/// Concurrent map with one lock per entry.
pub mod store;

/// Re-export clock types.
pub use clock::{Clock, ManualClock, SystemClock, humanize};
/// Re-export the cooldown registry.
pub use cooldown::CooldownRegistry;
/// Re-export identifier types.
pub use id::{AccountKey, GroupId, PlayerId};
/// Re-export the ledger.
pub use ledger::{BalanceChange, Ledger};
/// Re-export money types.
pub use money::{Delta, Money};
/// Re-export the keyed store.
pub use store::KeyedStore;
