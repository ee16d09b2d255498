//!
//! Reflow - a declarative dataflow framework
//!
//! Declare named data tables and plain functions that react to table
//! events; Reflow builds the dependency graph from those declarations and
//! propagates a triggering event synchronously through every downstream
//! function.
//!
//! This facade crate re-exports the core engine ([`reflow_core`]) and the
//! in-memory store ([`reflow_store_inmemory`]).
//!
//! # Quickstart
//!
//! ```
//! use reflow::{
//!     CoreError, ExecutionContext, Graph, InMemoryTableStore, Record, Runtime, TableEvent,
//!     TableMetadata,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut graph = Graph::new();
//! let orders = graph.register_table(TableMetadata::new("orders"))?;
//! graph.register_table(TableMetadata::new("shipments"))?;
//!
//! // A manual entry point, triggered externally by name.
//! graph.register_function(
//!     "place_order",
//!     |event: &TableEvent, ctx: &mut ExecutionContext| -> Result<(), CoreError> {
//!         let payload = event.payload.clone().unwrap_or_else(Record::null);
//!         ctx.table("orders")?.append(payload)?;
//!         Ok(())
//!     },
//! )?;
//!
//! // Reacts to every batch appended to `orders`.
//! graph.on_new_records(
//!     &orders,
//!     "ship",
//!     |event: &TableEvent, ctx: &mut ExecutionContext| -> Result<(), CoreError> {
//!         for order in event.new_records() {
//!             let id = order.get("id").cloned().unwrap_or_default();
//!             ctx.table("shipments")?.append(Record::new(json!({"order": id})))?;
//!         }
//!         Ok(())
//!     },
//! )?;
//!
//! let runtime = Runtime::new(graph, Arc::new(InMemoryTableStore::new()))?;
//! runtime
//!     .trigger("place_order", TableEvent::external(Record::new(json!({"id": 7}))))
//!     .map_err(|e| CoreError::from(e.to_string()))?;
//!
//! assert_eq!(runtime.read("shipments")?.len(), 1);
//! # Ok::<(), CoreError>(())
//! ```

#![forbid(unsafe_code)]

pub use reflow_core::{
    application, domain, error, types, CoreError, DispatchError, DispatchSummary, Dispatcher,
    EdgeConfig, EventId, EventSink, ExecutionContext, FunctionRef, Graph, GraphDescription,
    ReactiveFn, Record, RecordBatch, Runtime, SchemaHint, StoreError, TableAction, TableEvent,
    TableHandle, TableKey, TableMetadata, TableRef, TableStore, TriggerType, DEFAULT_MAX_DEPTH,
};

pub use reflow_store_inmemory::InMemoryTableStore;
