pub mod action;
pub mod balance;
pub mod property;
pub mod stash;

use std::path::Path;

use colored::Colorize;
use kp_core::AccountKey;
use kp_economy::{Economy, EconomyConfig, Refusal, SnapshotStore};
use tracing::error;

/// One invocation's view of the game: the loaded economy and the acting
/// player.
pub struct Session {
    pub economy: Economy,
    pub key: AccountKey,
    persist: bool,
}

impl Session {
    /// Load the config and the saved state from `data_dir`.
    ///
    /// A snapshot that fails to load is logged and the session starts from
    /// an empty economy. Such a session never saves, so the damaged files
    /// are left for inspection instead of being overwritten.
    pub fn open(
        data_dir: &Path,
        config: Option<&Path>,
        group: u64,
        player: u64,
    ) -> Result<Self, String> {
        let config = match config {
            Some(path) => EconomyConfig::from_file(path),
            None => EconomyConfig::builtin(),
        }
        .map_err(|e| e.to_string())?;

        let economy = Economy::new(config).with_store(SnapshotStore::in_directory(data_dir));
        let persist = match economy.load_all() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, dir = %data_dir.display(), "could not load saved state");
                eprintln!(
                    "{}",
                    format!("warning: {e}; starting fresh and not saving").yellow()
                );
                false
            }
        };

        Ok(Self {
            economy,
            key: AccountKey::new(group, player),
            persist,
        })
    }

    /// Write the state back to disk.
    pub fn save(&self) -> Result<(), String> {
        if !self.persist {
            return Ok(());
        }
        self.economy
            .save_all()
            .map_err(|e| format!("failed to save game state: {e}"))
    }
}

/// Tell the player why nothing happened.
fn refused(refusal: &Refusal) -> Result<(), String> {
    println!("  {}", refusal.to_string().yellow());
    Ok(())
}
