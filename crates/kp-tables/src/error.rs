//! Error types for event table construction.

use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while building an event table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// A table needs at least one outcome.
    #[error("event table has no outcomes")]
    Empty,

    /// Every outcome must be selectable.
    #[error("outcome {index} has zero weight")]
    ZeroWeight {
        /// Position of the offending outcome.
        index: usize,
    },

    /// A random range whose lower bound is above its upper bound.
    #[error("outcome {index} has an inverted range: {min} > {max}")]
    InvertedRange {
        /// Position of the offending outcome.
        index: usize,
        /// Lower bound as written.
        min: i64,
        /// Upper bound as written.
        max: i64,
    },

    /// The weights add up to more than a roll can address.
    #[error("total weight overflows")]
    WeightOverflow,
}
