//! Error types for configuration and persistence.
//!
//! Player-facing refusals (cooldowns, missing funds) are not errors; see
//! [`crate::refusal::Refusal`].

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating an [`crate::EconomyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config is not valid JSON for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but breaks an invariant.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors raised while loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing a record failed.
    #[error("snapshot record '{record}': {source}")]
    Io {
        /// Name of the record.
        record: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A record held data that could not be decoded.
    #[error("snapshot record '{record}' is corrupt: {source}")]
    Decode {
        /// Name of the record.
        record: &'static str,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("failed to encode snapshot record '{record}': {source}")]
    Encode {
        /// Name of the record.
        record: &'static str,
        /// The underlying encode error.
        source: serde_json::Error,
    },

    /// A background save did not finish in time.
    #[error("snapshot save timed out after {0:?}")]
    Timeout(Duration),

    /// A background save task panicked or was cancelled.
    #[error("snapshot save task failed: {0}")]
    Task(String),
}
