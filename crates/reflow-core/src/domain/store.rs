//! Storage collaborator interface
//!
//! The core never talks to a database directly; it appends to and reads
//! from an append-only record store through this trait. External crates
//! implement it to provide concrete backends.

use crate::domain::table::TableKey;
use crate::error::StoreError;
use crate::types::{Record, SchemaHint};

/// An append-only record store keyed by qualified table name
///
/// Implementations must preserve per-table insertion order: `read` returns
/// records in the order they were appended, with no deduplication.
pub trait TableStore: Send + Sync {
    /// Whether the table has been materialized
    fn exists(&self, table: &TableKey) -> bool;

    /// Materialize the table; fails with [`StoreError::AlreadyExists`] if it exists
    ///
    /// `sample` is the batch that prompted creation, provided for schema
    /// inference only; it is NOT written. The caller appends it separately.
    fn create(
        &self,
        table: &TableKey,
        schema: &SchemaHint,
        sample: &[Record],
    ) -> Result<(), StoreError>;

    /// Append records to an existing table; requires `exists(table)`
    fn append(&self, table: &TableKey, records: &[Record]) -> Result<(), StoreError>;

    /// All records stored for the table, in insertion order
    ///
    /// Returns an empty sequence if the table was never created.
    fn read(&self, table: &TableKey) -> Result<Vec<Record>, StoreError>;
}
