use crate::domain::events::{EventSink, TableEvent};
use crate::domain::graph::Graph;
use crate::domain::store::TableStore;
use crate::domain::table::{TableKey, TableMetadata};
use crate::error::CoreError;
use crate::types::{Record, RecordBatch, SchemaHint};
use std::sync::Arc;
use tracing::debug;

/// Per-invocation execution scope handed to reactive functions
///
/// Owns the event sink for exactly one function invocation: appends made
/// through [`ExecutionContext::table`] land here and nowhere else, so two
/// dispatches can never misattribute each other's side effects. The
/// dispatcher creates a fresh context per invocation and drains it after
/// the function returns; calling a function directly with a context you
/// built yourself runs its appends but propagates nothing.
pub struct ExecutionContext {
    graph: Arc<Graph>,
    store: Arc<dyn TableStore>,
    sink: EventSink,
}

impl ExecutionContext {
    /// Create a context over a graph and a storage collaborator
    pub fn new(graph: Arc<Graph>, store: Arc<dyn TableStore>) -> Self {
        Self {
            graph,
            store,
            sink: EventSink::new(),
        }
    }

    /// A handle on a registered table, scoped to this invocation
    ///
    /// Fails with [`CoreError::TableNotFound`] if the table is not in the
    /// graph registry.
    pub fn table(&mut self, table: impl Into<TableKey>) -> Result<TableHandle<'_>, CoreError> {
        let key = table.into();
        let metadata = self
            .graph
            .table_metadata(&key)
            .ok_or_else(|| CoreError::TableNotFound(key.to_string()))?;
        Ok(TableHandle {
            metadata,
            store: &*self.store,
            sink: &mut self.sink,
        })
    }

    /// Number of events emitted so far in this invocation
    pub fn pending_events(&self) -> usize {
        self.sink.len()
    }

    /// Consume the context, yielding the emitted events in production order
    pub fn into_events(self) -> Vec<TableEvent> {
        let mut sink = self.sink;
        sink.drain()
    }
}

/// A table handle bound to one invocation's execution context
///
/// Appends write through to storage and emit exactly one `Update` event
/// into the owning context, whatever the batch size.
pub struct TableHandle<'a> {
    metadata: &'a TableMetadata,
    store: &'a dyn TableStore,
    sink: &'a mut EventSink,
}

impl std::fmt::Debug for TableHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableHandle")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl TableHandle<'_> {
    /// Metadata of the table this handle is bound to
    pub fn metadata(&self) -> &TableMetadata {
        self.metadata
    }

    /// Append a record or a batch of records to the table
    ///
    /// Materializes the storage table on first write, using the declared
    /// schema or one inferred from the batch. Emits one `Update` event per
    /// call regardless of how many records were appended.
    pub fn append(&mut self, records: impl Into<RecordBatch>) -> Result<(), CoreError> {
        let records = records.into().into_records();
        let key = self.metadata.key();
        if !self.store.exists(&key) {
            let schema = self
                .metadata
                .schema
                .clone()
                .unwrap_or_else(|| SchemaHint::infer(&records));
            self.store.create(&key, &schema, &records)?;
        }
        self.store.append(&key, &records)?;
        debug!(table = %key, count = records.len(), "appended records");
        self.sink.push(TableEvent::updated(key, records));
        Ok(())
    }

    /// All records currently stored for the table, in insertion order
    ///
    /// Empty if the table has not been materialized yet.
    pub fn read(&self) -> Result<Vec<Record>, CoreError> {
        Ok(self.store.read(&self.metadata.key())?)
    }
}
