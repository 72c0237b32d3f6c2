//! Weighted event tables for Kingpin.
//!
//! An [`EventTable`] is an immutable list of [`Outcome`]s. Each outcome has
//! a relative weight, a [`ValueRule`] that produces a signed money delta,
//! and a [`MessageTemplate`] that turns the realized delta into a line of
//! narrative. Rolling picks one outcome with probability
//! `weight / total_weight` and realizes its value exactly once.

/// Errors raised while building a table.
pub mod error;
/// Narrative templates with an `{amount}` placeholder.
pub mod message;
/// Weighted tables and the roll that picks from them.
pub mod table;
/// Rules that turn an outcome into a money delta.
pub mod value;

/// Re-export error types.
pub use error::{TableError, TableResult};
/// Re-export the message template.
pub use message::MessageTemplate;
/// Re-export table types.
pub use table::{EventTable, Outcome, Roll};
/// Re-export the value rule.
pub use value::ValueRule;
