//! Action kinds and their configuration.

use chrono::{DateTime, TimeDelta, Utc};
use kp_core::{Delta, Money};
use kp_tables::EventTable;
use serde::{Deserialize, Serialize};

use crate::config::secs;

/// A player-initiated money-making activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Streetwork: near-certain small change.
    Beg,
    /// General labor: steady, moderate pay.
    Work,
    /// A risky favor: big swings both ways.
    Favor,
}

impl ActionKind {
    /// Every action kind.
    pub const ALL: [Self; 3] = [Self::Beg, Self::Work, Self::Favor];

    /// Parse an action kind from a user-supplied string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beg" => Some(Self::Beg),
            "work" => Some(Self::Work),
            "favor" | "favour" => Some(Self::Favor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beg => write!(f, "beg"),
            Self::Work => write!(f, "work"),
            Self::Favor => write!(f, "favor"),
        }
    }
}

/// What distinguishes one cooldown from another for the same player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CooldownKind {
    /// A money-making action.
    Action(ActionKind),
    /// Producing a substance, by name.
    Produce(String),
}

/// Cooldown and outcome table of one action kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Seconds between uses.
    pub cooldown_secs: u64,
    /// Outcomes to roll.
    pub table: EventTable,
}

impl ActionConfig {
    /// Time between uses.
    pub fn cooldown(&self) -> TimeDelta {
        secs(self.cooldown_secs)
    }
}

/// Per-kind action configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTables {
    /// Begging.
    pub beg: ActionConfig,
    /// Working.
    pub work: ActionConfig,
    /// Risky favors.
    pub favor: ActionConfig,
}

impl ActionTables {
    /// The configuration for `kind`.
    pub fn get(&self, kind: ActionKind) -> &ActionConfig {
        match kind {
            ActionKind::Beg => &self.beg,
            ActionKind::Work => &self.work,
            ActionKind::Favor => &self.favor,
        }
    }
}

/// The result of a completed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// Which action ran.
    pub kind: ActionKind,
    /// Narrative for the player.
    pub message: String,
    /// The delta the table rolled.
    pub rolled: Delta,
    /// The delta that landed on the balance (differs from `rolled` when a
    /// loss is clamped at zero).
    pub applied: Delta,
    /// Balance after the action.
    pub balance: Money,
    /// When the action may run again.
    pub next_allowed: DateTime<Utc>,
}
