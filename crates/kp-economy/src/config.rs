//! Static economy configuration: action tables, substances, ranks, and the
//! property catalog.
//!
//! Loaded once at startup and never changed afterwards. A built-in config
//! ships with the crate; a JSON file with the same shape can replace it.

use std::collections::HashSet;
use std::path::Path;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::action::{ActionConfig, ActionKind, ActionTables};
use crate::error::{ConfigError, ConfigResult};
use crate::property::Property;
use crate::rank::RankTable;
use crate::stash::Substance;

/// The built-in configuration, as JSON.
pub const BUILTIN_CONFIG: &str = include_str!("data/economy.json");

/// Everything the economy needs to know that isn't player state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Outcome tables and cooldowns per action kind.
    pub actions: ActionTables,
    /// Producible substances.
    pub substances: Vec<Substance>,
    /// Rank ladder, lowest first.
    pub ranks: RankTable,
    /// Property catalog. Indices are stable identifiers.
    pub properties: Vec<Property>,
    /// Seconds between property income collections.
    pub collect_interval_secs: u64,
}

impl EconomyConfig {
    /// The configuration shipped with the crate.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_json_str(BUILTIN_CONFIG)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check cross-field invariants serde can't express.
    pub fn validate(&self) -> ConfigResult<()> {
        self.ranks.validate()?;

        let mut seen = HashSet::new();
        for substance in &self.substances {
            if substance.name.trim().is_empty() {
                return Err(ConfigError::Invalid("substance with an empty name".into()));
            }
            if !seen.insert(substance.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "substance '{}' is listed twice",
                    substance.name
                )));
            }
            if substance.min_rank >= self.ranks.len() {
                return Err(ConfigError::Invalid(format!(
                    "substance '{}' requires rank {} but only {} ranks exist",
                    substance.name,
                    substance.min_rank,
                    self.ranks.len()
                )));
            }
            if substance.yield_min == 0 || substance.yield_min > substance.yield_max {
                return Err(ConfigError::Invalid(format!(
                    "substance '{}' has a bad yield range {}..={}",
                    substance.name, substance.yield_min, substance.yield_max
                )));
            }
            if substance.price_per_gram.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "substance '{}' has no price",
                    substance.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "property '{}' is listed twice",
                    property.name
                )));
            }
        }

        if self.collect_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "collect_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The configuration of one action kind.
    pub fn action(&self, kind: ActionKind) -> &ActionConfig {
        self.actions.get(kind)
    }

    /// Look up a substance by name, ignoring case.
    pub fn substance(&self, name: &str) -> Option<&Substance> {
        let name = name.trim();
        self.substances
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Time between property income collections.
    pub fn collect_interval(&self) -> TimeDelta {
        secs(self.collect_interval_secs)
    }
}

/// Whole seconds as a `TimeDelta`, saturating at the largest representable
/// span.
pub(crate) fn secs(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
