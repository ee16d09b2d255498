/// Per-invocation execution scope and table handles
pub mod context;

/// Depth-first event propagation over a graph
pub mod dispatcher;

/// Runtime interface for external drivers
pub mod runtime;
