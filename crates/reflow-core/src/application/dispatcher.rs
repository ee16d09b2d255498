use crate::application::context::ExecutionContext;
use crate::domain::events::TableEvent;
use crate::domain::graph::{Graph, TriggerType};
use crate::domain::store::TableStore;
use crate::error::{CoreError, DispatchError};
use crate::ReactiveFn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default dispatch depth budget
///
/// Deep enough for any realistic acyclic cascade; a cyclic graph blows
/// through it and surfaces as a typed error instead of stack exhaustion.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Counters describing a completed dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Number of function invocations in the cascade, including the root
    pub invocations: usize,

    /// Number of events drained and routed across the cascade
    pub events_processed: usize,
}

/// One pending function invocation in the cascade
struct Frame {
    fn_name: String,
    handler: Arc<dyn ReactiveFn>,
    event: TableEvent,
    depth: usize,
}

/// Synchronous, depth-first event propagation over a graph
///
/// A dispatch is a single unbroken call chain: the triggered function runs
/// to completion, its emitted events are drained, and each event's
/// downstream edges fire in registration order. A fired function's entire
/// cascade completes before the next sibling edge fires. The traversal uses
/// an explicit frame stack with a per-frame depth, so cyclic graphs fail
/// with [`CoreError::DispatchDepthExceeded`] rather than overflowing the
/// call stack.
pub struct Dispatcher {
    graph: Arc<Graph>,
    store: Arc<dyn TableStore>,
    max_depth: usize,
}

impl Dispatcher {
    /// Create a dispatcher over a graph and a storage collaborator
    pub fn new(graph: Arc<Graph>, store: Arc<dyn TableStore>) -> Self {
        Self {
            graph,
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the dispatch depth budget
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The graph this dispatcher routes over
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Run a registered function against a triggering event and propagate
    /// its effects transitively through the graph
    ///
    /// Fails fast: the first failing invocation aborts the remainder of the
    /// cascade, and the returned [`DispatchError`] names the failed function
    /// and every queued function that never ran. Effects of invocations that
    /// completed before the failure stand; there is no rollback.
    pub fn execute_function(
        &self,
        name: &str,
        event: TableEvent,
    ) -> Result<DispatchSummary, DispatchError> {
        let handler = self
            .graph
            .function(name)
            .cloned()
            .ok_or_else(|| DispatchError {
                function: name.to_string(),
                source: CoreError::FunctionNotFound(name.to_string()),
                never_ran: Vec::new(),
            })?;

        let mut stack = vec![Frame {
            fn_name: name.to_string(),
            handler,
            event,
            depth: 0,
        }];
        let mut summary = DispatchSummary::default();

        while let Some(frame) = stack.pop() {
            if frame.depth > self.max_depth {
                let source = CoreError::DispatchDepthExceeded {
                    function: frame.fn_name.clone(),
                    budget: self.max_depth,
                };
                return Err(abort(frame.fn_name, source, &[], &stack));
            }

            info!(function = %frame.fn_name, depth = frame.depth, "executing function");
            let mut ctx = ExecutionContext::new(self.graph.clone(), self.store.clone());
            if let Err(source) = frame.handler.call(&frame.event, &mut ctx) {
                return Err(abort(frame.fn_name, source, &[], &stack));
            }
            let events = ctx.into_events();
            summary.invocations += 1;
            summary.events_processed += events.len();
            debug!(function = %frame.fn_name, count = events.len(), "drained events");

            let mut downstream = Vec::new();
            for event in events {
                let Some(table) = event.table.clone() else {
                    continue;
                };
                for edge in self.graph.get_out_edges(&table) {
                    if edge.trigger_type == TriggerType::NewRecords
                        && event.new_records().is_empty()
                    {
                        continue;
                    }
                    let Some(handler) = self.graph.function(&edge.fn_name).cloned() else {
                        let source = CoreError::UnboundEdge(format!(
                            "edge {} -> {} references unregistered function {}",
                            edge.table_name, edge.fn_name, edge.fn_name
                        ));
                        return Err(abort(edge.fn_name.clone(), source, &downstream, &stack));
                    };
                    downstream.push(Frame {
                        fn_name: edge.fn_name.clone(),
                        handler,
                        event: event.clone(),
                        depth: frame.depth + 1,
                    });
                }
            }

            // LIFO stack: pushed in reverse so the first event's first edge
            // pops next, preserving strict depth-first order.
            for child in downstream.into_iter().rev() {
                stack.push(child);
            }
        }

        Ok(summary)
    }
}

/// Build the cascade-abort error: `queued_first` holds frames assembled but
/// not yet pushed, `stack` the pending frames in LIFO order.
fn abort(
    function: String,
    source: CoreError,
    queued_first: &[Frame],
    stack: &[Frame],
) -> DispatchError {
    let mut never_ran: Vec<String> = queued_first.iter().map(|f| f.fn_name.clone()).collect();
    never_ran.extend(stack.iter().rev().map(|f| f.fn_name.clone()));
    warn!(
        function = %function,
        error = %source,
        skipped = never_ran.len(),
        "cascade aborted"
    );
    DispatchError {
        function,
        source,
        never_ran,
    }
}
