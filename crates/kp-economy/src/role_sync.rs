//! Notifications for whoever mirrors ranks into an external permission
//! system.

use kp_core::AccountKey;

/// A player's rank changed after a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankChange {
    /// Whose rank changed.
    pub key: AccountKey,
    /// Rank before the sale.
    pub previous: usize,
    /// Rank after the sale.
    pub rank: usize,
    /// Display name of the new rank.
    pub rank_name: String,
}

/// Receives rank changes. Called after every entry lock has been released.
pub trait RoleSync: Send + Sync {
    /// React to a rank change.
    fn rank_changed(&self, change: &RankChange);
}

/// Ignores rank changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoleSync;

impl RoleSync for NoRoleSync {
    fn rank_changed(&self, _change: &RankChange) {}
}

impl<F> RoleSync for F
where
    F: Fn(&RankChange) + Send + Sync,
{
    fn rank_changed(&self, change: &RankChange) {
        self(change);
    }
}
