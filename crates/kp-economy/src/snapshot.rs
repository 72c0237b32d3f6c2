//! Point-in-time persistence of every per-player map.
//!
//! A snapshot is four JSON records: balances, stashes, property ownership
//! and collection timers. Cooldowns are not persisted. Each save replaces
//! the previous records wholesale; there is no incremental log.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kp_core::{GroupId, Money, PlayerId};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{SnapshotError, SnapshotResult};

/// Record holding balances.
pub const LEDGER_RECORD: &str = "ledger";
/// Record holding stashes.
pub const STASH_RECORD: &str = "stash";
/// Record holding owned property indices.
pub const PROPERTIES_RECORD: &str = "properties";
/// Record holding property collection timers.
pub const COLLECTIONS_RECORD: &str = "collections";

/// One persisted balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Group of the account.
    pub group: GroupId,
    /// Player of the account.
    pub player: PlayerId,
    /// Balance.
    #[serde(rename = "balance_cents")]
    pub balance: Money,
}

/// One persisted stash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashRecord {
    /// Group of the account.
    pub group: GroupId,
    /// Player of the account.
    pub player: PlayerId,
    /// Grams per substance.
    #[serde(default)]
    pub quantities: BTreeMap<String, u64>,
    /// Rank index at save time.
    #[serde(default)]
    pub rank: usize,
    /// Lifetime sales proceeds.
    #[serde(rename = "lifetime_proceeds_cents", default)]
    pub lifetime_proceeds: Money,
}

/// One player's persisted property indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    /// Group of the account.
    pub group: GroupId,
    /// Player of the account.
    pub player: PlayerId,
    /// Owned catalog indices, ascending.
    pub properties: Vec<usize>,
}

/// One player's persisted collection timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectRecord {
    /// Group of the account.
    pub group: GroupId,
    /// Player of the account.
    pub player: PlayerId,
    /// Earliest next collection.
    pub next_collect: DateTime<Utc>,
}

/// Every persisted map, decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Balances.
    pub balances: Vec<BalanceRecord>,
    /// Stashes.
    pub stashes: Vec<StashRecord>,
    /// Property ownership.
    pub ownership: Vec<OwnershipRecord>,
    /// Collection timers.
    pub collections: Vec<CollectRecord>,
}

/// Raw storage for named snapshot records.
pub trait SnapshotBackend: Send + Sync {
    /// Read a record. A record that was never written is `Ok(None)`.
    fn read(&self, record: &str) -> io::Result<Option<Vec<u8>>>;

    /// Replace a record.
    fn write(&self, record: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Stores each record as `<dir>/<record>.json`.
///
/// Writes go to a uniquely named temporary file in the same directory and
/// are renamed into place, so a crash mid-save leaves the previous record
/// intact and two writers never share a temporary file.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    dir: PathBuf,
}

impl DirectoryBackend {
    /// Use `dir`, creating it on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory records live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, record: &str) -> PathBuf {
        self.dir.join(format!("{record}.json"))
    }
}

impl SnapshotBackend for DirectoryBackend {
    fn read(&self, record: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path(record)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, record: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(self.path(record)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Keeps records in memory. Useful for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self, record: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.records.lock().get(record).cloned())
    }

    fn write(&self, record: &str, bytes: &[u8]) -> io::Result<()> {
        self.records.lock().insert(record.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Encodes snapshots into records on a backend.
///
/// One save or load runs at a time. A save writes all four records before
/// another save or a load can start, so records from different saves are
/// never mixed.
pub struct SnapshotStore {
    backend: Box<dyn SnapshotBackend>,
    io: Mutex<()>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").finish_non_exhaustive()
    }
}

impl SnapshotStore {
    /// Wrap a backend.
    pub fn new(backend: impl SnapshotBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            io: Mutex::new(()),
        }
    }

    /// Store records as JSON files under `dir`.
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirectoryBackend::new(dir))
    }

    /// Store records in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// The underlying backend.
    pub fn backend(&self) -> &dyn SnapshotBackend {
        self.backend.as_ref()
    }

    /// Read and decode every record. Missing records decode as empty.
    ///
    /// Nothing is returned unless all four records decode, so a caller
    /// never restores half a snapshot.
    pub fn load(&self) -> SnapshotResult<Snapshot> {
        let _io = self.io.lock();
        Ok(Snapshot {
            balances: self.read_record(LEDGER_RECORD)?,
            stashes: self.read_record(STASH_RECORD)?,
            ownership: self.read_record(PROPERTIES_RECORD)?,
            collections: self.read_record(COLLECTIONS_RECORD)?,
        })
    }

    /// Encode and write every record, replacing what was there.
    pub fn save(&self, snapshot: &Snapshot) -> SnapshotResult<()> {
        let _io = self.io.lock();
        self.write_records(snapshot)
    }

    /// Take a snapshot with `take` and save it.
    ///
    /// `take` runs once no other save is in progress, so overlapping
    /// callers land on disk in the order their snapshots were taken and
    /// the last save to finish holds the newest state.
    pub fn save_with(&self, take: impl FnOnce() -> Snapshot) -> SnapshotResult<()> {
        let _io = self.io.lock();
        self.write_records(&take())
    }

    fn write_records(&self, snapshot: &Snapshot) -> SnapshotResult<()> {
        self.write_record(LEDGER_RECORD, &snapshot.balances)?;
        self.write_record(STASH_RECORD, &snapshot.stashes)?;
        self.write_record(PROPERTIES_RECORD, &snapshot.ownership)?;
        self.write_record(COLLECTIONS_RECORD, &snapshot.collections)?;
        Ok(())
    }

    fn read_record<T: DeserializeOwned>(&self, record: &'static str) -> SnapshotResult<Vec<T>> {
        let Some(bytes) = self
            .backend
            .read(record)
            .map_err(|source| SnapshotError::Io { record, source })?
        else {
            debug!(record, "snapshot record missing, starting empty");
            return Ok(Vec::new());
        };
        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Decode { record, source })
    }

    fn write_record<T: Serialize>(&self, record: &'static str, rows: &[T]) -> SnapshotResult<()> {
        let bytes = serde_json::to_vec_pretty(rows)
            .map_err(|source| SnapshotError::Encode { record, source })?;
        self.backend
            .write(record, &bytes)
            .map_err(|source| SnapshotError::Io { record, source })?;
        debug!(record, rows = rows.len(), "snapshot record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            balances: vec![BalanceRecord {
                group: GroupId(1),
                player: PlayerId(2),
                balance: Money::from_cents(12_345),
            }],
            stashes: vec![StashRecord {
                group: GroupId(1),
                player: PlayerId(2),
                quantities: [("weed".to_string(), 12)].into_iter().collect(),
                rank: 1,
                lifetime_proceeds: Money::from_dollars(1_500),
            }],
            ownership: vec![OwnershipRecord {
                group: GroupId(1),
                player: PlayerId(2),
                properties: vec![0, 3],
            }],
            collections: vec![CollectRecord {
                group: GroupId(1),
                player: PlayerId(2),
                next_collect: DateTime::<Utc>::UNIX_EPOCH,
            }],
        }
    }

    #[test]
    fn empty_backend_loads_empty_snapshot() {
        let store = SnapshotStore::in_memory();
        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn directory_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        SnapshotStore::in_directory(&path).save(&sample()).unwrap();

        assert!(path.join("ledger.json").exists());
        let leftovers: Vec<_> = fs::read_dir(&path)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| !name.to_string_lossy().ends_with(".json"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
        let loaded = SnapshotStore::in_directory(&path).load().unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn save_replaces_previous_records() {
        let store = SnapshotStore::in_memory();
        store.save(&sample()).unwrap();
        store.save(&Snapshot::default()).unwrap();
        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn concurrent_saves_never_mix_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::in_directory(dir.path());
        let versions: Vec<Snapshot> = (0..8u64)
            .map(|n| {
                let mut snapshot = sample();
                for record in &mut snapshot.balances {
                    record.balance = Money::from_cents(n);
                }
                for record in &mut snapshot.stashes {
                    record.lifetime_proceeds = Money::from_cents(n);
                }
                snapshot
            })
            .collect();

        for _ in 0..20 {
            std::thread::scope(|s| {
                for version in &versions {
                    let store = &store;
                    s.spawn(move || store.save(version).unwrap());
                }
                let loaded = store.load().unwrap();
                if !loaded.balances.is_empty() {
                    assert_eq!(
                        loaded.balances[0].balance,
                        loaded.stashes[0].lifetime_proceeds
                    );
                }
            });
            let loaded = store.load().unwrap();
            assert!(versions.contains(&loaded));
        }
    }

    #[test]
    fn save_with_takes_the_snapshot_under_the_lock() {
        let store = SnapshotStore::in_memory();
        store.save(&sample()).unwrap();
        store
            .save_with(|| {
                assert!(store.io.try_lock().is_none());
                Snapshot::default()
            })
            .unwrap();
        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn corrupt_record_names_itself() {
        let store = SnapshotStore::in_memory();
        store.save(&sample()).unwrap();
        store.backend().write(STASH_RECORD, b"{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, SnapshotError::Decode { record: "stash", .. }));
    }
}
