//!
//! Reflow Core - Graph construction and event propagation for Reflow
//!
//! Developers declare named data tables and plain functions that react to
//! table events; this crate builds the implicit dependency graph from those
//! declarations and, given a triggering event, propagates execution
//! transitively through downstream functions, synchronously and
//! depth-first, on the calling thread.
//!
//! Storage is an external collaborator behind the
//! [`domain::store::TableStore`] trait; the core performs no I/O of its own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - graph registry, tables, events, storage seam
pub mod domain;

/// Application services - execution context, dispatcher, runtime
pub mod application;

/// Core types
pub mod types;

/// Error types
pub mod error;

// Re-export key types
pub use error::{CoreError, DispatchError, StoreError};
pub use types::{Record, RecordBatch, SchemaHint};

pub use domain::events::{EventId, EventSink, TableAction, TableEvent};
pub use domain::graph::{EdgeConfig, FunctionRef, Graph, GraphDescription, TriggerType};
pub use domain::store::TableStore;
pub use domain::table::{TableKey, TableMetadata, TableRef};

pub use application::context::{ExecutionContext, TableHandle};
pub use application::dispatcher::{DispatchSummary, Dispatcher, DEFAULT_MAX_DEPTH};
pub use application::runtime::Runtime;

/// A function that reacts to table events
///
/// Implemented for free by any closure of the matching shape; implement it
/// on a struct when the reaction carries configuration. The function may
/// append to any registered table through the context; each append is
/// captured by the invocation's own event sink and routed by the dispatcher
/// after the function returns.
pub trait ReactiveFn: Send + Sync {
    /// React to a triggering event
    fn call(&self, event: &TableEvent, ctx: &mut ExecutionContext) -> Result<(), CoreError>;
}

impl<F> ReactiveFn for F
where
    F: Fn(&TableEvent, &mut ExecutionContext) -> Result<(), CoreError> + Send + Sync,
{
    fn call(&self, event: &TableEvent, ctx: &mut ExecutionContext) -> Result<(), CoreError> {
        self(event, ctx)
    }
}
