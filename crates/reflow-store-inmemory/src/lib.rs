//! In-memory table store implementation for the Reflow dataflow framework
//!
//! This crate provides an in-memory implementation of the `TableStore`
//! trait defined in the reflow-core crate. It is primarily useful for
//! development, testing, and simple deployments where persistence is not
//! required.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use dashmap::DashMap;
use reflow_core::{Record, SchemaHint, StoreError, TableKey, TableStore};
use tracing::debug;

/// Per-table storage: the schema hint captured at creation plus the
/// append-only record log.
#[derive(Debug, Clone)]
struct StoredTable {
    schema: SchemaHint,
    records: Vec<Record>,
}

/// An append-only record store held entirely in process memory
///
/// Tables are keyed by qualified name in a concurrent map, so a store can
/// be shared across threads behind an `Arc` without external locking.
/// Records preserve insertion order per table.
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: DashMap<TableKey, StoredTable>,
}

impl InMemoryTableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualified names of every materialized table, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        names.sort();
        names
    }

    /// The schema hint captured when the table was created
    pub fn schema(&self, table: &TableKey) -> Option<SchemaHint> {
        self.tables.get(table).map(|entry| entry.schema.clone())
    }

    /// Number of records stored for the table, zero if never created
    pub fn record_count(&self, table: &TableKey) -> usize {
        self.tables
            .get(table)
            .map(|entry| entry.records.len())
            .unwrap_or(0)
    }
}

impl TableStore for InMemoryTableStore {
    fn exists(&self, table: &TableKey) -> bool {
        self.tables.contains_key(table)
    }

    fn create(
        &self,
        table: &TableKey,
        schema: &SchemaHint,
        _sample: &[Record],
    ) -> Result<(), StoreError> {
        if self.tables.contains_key(table) {
            return Err(StoreError::AlreadyExists(table.to_string()));
        }
        debug!(table = %table, fields = schema.fields.len(), "created table");
        self.tables.insert(
            table.clone(),
            StoredTable {
                schema: schema.clone(),
                records: Vec::new(),
            },
        );
        Ok(())
    }

    fn append(&self, table: &TableKey, records: &[Record]) -> Result<(), StoreError> {
        let mut stored = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::NotFound(table.to_string()))?;
        stored.records.extend_from_slice(records);
        debug!(table = %table, count = records.len(), "appended records");
        Ok(())
    }

    fn read(&self, table: &TableKey) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .tables
            .get(table)
            .map(|entry| entry.records.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests;
