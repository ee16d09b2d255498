use crate::application::context::ExecutionContext;
use crate::application::dispatcher::{DispatchSummary, Dispatcher};
use crate::domain::events::TableEvent;
use crate::domain::graph::{Graph, GraphDescription};
use crate::domain::store::TableStore;
use crate::domain::table::TableKey;
use crate::error::{CoreError, DispatchError};
use crate::types::Record;
use std::sync::Arc;

/// The main API provided to external drivers
///
/// Surrounding glue (HTTP endpoints, CLIs, schedulers) holds a `Runtime`,
/// enumerates the graph through it, and injects externally sourced events
/// by function name. Construction validates the graph, so dispatch never
/// meets a dangling edge.
pub struct Runtime {
    graph: Arc<Graph>,
    store: Arc<dyn TableStore>,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Create a runtime over a fully declared graph and a storage collaborator
    ///
    /// Fails with [`CoreError::UnboundEdge`] if any registered edge
    /// references a table or function that was never registered.
    pub fn new(graph: Graph, store: Arc<dyn TableStore>) -> Result<Self, CoreError> {
        graph.validate()?;
        let graph = Arc::new(graph);
        Ok(Self {
            graph: graph.clone(),
            store: store.clone(),
            dispatcher: Dispatcher::new(graph, store),
        })
    }

    /// Override the dispatch depth budget
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.dispatcher = self.dispatcher.with_max_depth(max_depth);
        self
    }

    /// Trigger a registered function with an externally sourced event
    pub fn trigger(
        &self,
        function: &str,
        event: TableEvent,
    ) -> Result<DispatchSummary, DispatchError> {
        self.dispatcher.execute_function(function, event)
    }

    /// The graph this runtime dispatches over
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Serializable snapshot of the graph for external consumers
    pub fn describe(&self) -> GraphDescription {
        self.graph.describe()
    }

    /// Read a registered table's records outside any dispatch
    pub fn read(&self, table: impl Into<TableKey>) -> Result<Vec<Record>, CoreError> {
        let key = table.into();
        if self.graph.table_metadata(&key).is_none() {
            return Err(CoreError::TableNotFound(key.to_string()));
        }
        Ok(self.store.read(&key)?)
    }

    /// A fresh execution context for calling a function directly
    ///
    /// Appends made through this context write to storage and buffer their
    /// events, but nothing drains them: direct calls never propagate.
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(self.graph.clone(), self.store.clone())
    }
}
