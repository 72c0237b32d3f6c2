use serde::{Deserialize, Serialize};

/// An isolation boundary (a server or community). Balances and ownership
/// are tracked independently per group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(pub u64);

/// A player, unique across the whole platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// The key of every per-player map: one player inside one group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AccountKey {
    /// The group the player is acting in.
    pub group: GroupId,
    /// The acting player.
    pub player: PlayerId,
}

impl AccountKey {
    /// Build a key from raw group and player ids.
    pub const fn new(group: u64, player: u64) -> Self {
        Self {
            group: GroupId(group),
            player: PlayerId(player),
        }
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group, self.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display() {
        assert_eq!(AccountKey::new(7, 42).to_string(), "7/42");
    }

    #[test]
    fn keys_order_by_group_then_player() {
        let mut keys = vec![
            AccountKey::new(2, 1),
            AccountKey::new(1, 9),
            AccountKey::new(1, 3),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                AccountKey::new(1, 3),
                AccountKey::new(1, 9),
                AccountKey::new(2, 1),
            ]
        );
    }
}
