use crate::domain::table::{TableKey, TableMetadata, TableRef};
use crate::error::CoreError;
use crate::ReactiveFn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The kind of table action an edge reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Fire whenever the source table is updated; a page-agnostic signal
    Update,
    /// Fire with the incrementally appended batch; skipped for empty batches
    NewRecords,
}

/// A directed binding from a table and a trigger kind to a function
///
/// Created once per registration call; never mutated, never removed.
/// Multiple edges may share a `table_name` (fan-out) or a `fn_name`
/// (fan-in from multiple tables).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeConfig {
    /// Qualified key of the source table
    pub table_name: TableKey,

    /// Name of the target function
    pub fn_name: String,

    /// The trigger kind this edge reacts to
    pub trigger_type: TriggerType,
}

/// Value object: handle returned by function registration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef(pub String);

impl FunctionRef {
    /// The registered function name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serializable snapshot of a graph for external consumers
///
/// Surrounding glue (HTTP binding, visualization) enumerates the registry
/// through this view; the callables themselves are not serializable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphDescription {
    /// Metadata of every registered table
    pub tables: Vec<TableMetadata>,

    /// Names of every registered function, sorted
    pub functions: Vec<String>,

    /// Every edge, in registration order
    pub edges: Vec<EdgeConfig>,
}

/// The complete registry of tables, functions, and edges
///
/// A graph is an explicit value: build one per process, per test, or per
/// tenant; nothing here is process-wide. Registration is fallible: a name
/// collision is a construction-time error, not a silent overwrite.
#[derive(Default)]
pub struct Graph {
    functions: HashMap<String, Arc<dyn ReactiveFn>>,
    tables: HashMap<TableKey, TableMetadata>,
    edges: Vec<EdgeConfig>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("functions", &self.function_names())
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .field("edges", &self.edges)
            .finish()
    }
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table
    ///
    /// Fails with [`CoreError::DuplicateName`] if a table with the same
    /// qualified key is already registered; the registry is left unchanged.
    pub fn register_table(&mut self, metadata: TableMetadata) -> Result<TableRef, CoreError> {
        let key = metadata.key();
        if self.tables.contains_key(&key) {
            return Err(CoreError::DuplicateName(key.to_string()));
        }
        debug!(table = %key, "registered table");
        self.tables.insert(key.clone(), metadata);
        Ok(TableRef(key))
    }

    /// Register a function under a unique name, with no edge
    ///
    /// A function with no inbound edge is a manual entry point: it only ever
    /// runs when an external driver triggers it by name.
    pub fn register_function<F>(&mut self, name: &str, handler: F) -> Result<FunctionRef, CoreError>
    where
        F: ReactiveFn + 'static,
    {
        if self.functions.contains_key(name) {
            return Err(CoreError::DuplicateName(name.to_string()));
        }
        debug!(function = %name, "registered function");
        self.functions.insert(name.to_string(), Arc::new(handler));
        Ok(FunctionRef(name.to_string()))
    }

    /// Register a function as a consumer of a table's `Update` trigger
    pub fn on_update<F>(
        &mut self,
        table: &TableRef,
        name: &str,
        handler: F,
    ) -> Result<FunctionRef, CoreError>
    where
        F: ReactiveFn + 'static,
    {
        self.bind(table, name, handler, TriggerType::Update)
    }

    /// Register a function as a consumer of a table's `NewRecords` trigger
    ///
    /// The function receives only the incrementally appended batch via
    /// [`crate::TableEvent::new_records`] and does not fire for empty batches.
    pub fn on_new_records<F>(
        &mut self,
        table: &TableRef,
        name: &str,
        handler: F,
    ) -> Result<FunctionRef, CoreError>
    where
        F: ReactiveFn + 'static,
    {
        self.bind(table, name, handler, TriggerType::NewRecords)
    }

    fn bind<F>(
        &mut self,
        table: &TableRef,
        name: &str,
        handler: F,
        trigger_type: TriggerType,
    ) -> Result<FunctionRef, CoreError>
    where
        F: ReactiveFn + 'static,
    {
        if !self.tables.contains_key(table.key()) {
            return Err(CoreError::TableNotFound(table.key().to_string()));
        }
        let function = self.register_function(name, handler)?;
        self.register_edge(table.key().clone(), name, trigger_type);
        Ok(function)
    }

    /// Append a raw edge to the registry
    ///
    /// Intended for config-driven assembly where declarations arrive out of
    /// order; the edge may dangle until both endpoints are registered, and
    /// [`Graph::validate`] reports any edge still unbound.
    pub fn register_edge(
        &mut self,
        table_name: TableKey,
        fn_name: &str,
        trigger_type: TriggerType,
    ) {
        debug!(table = %table_name, function = %fn_name, ?trigger_type, "registered edge");
        self.edges.push(EdgeConfig {
            table_name,
            fn_name: fn_name.to_string(),
            trigger_type,
        });
    }

    /// Every edge whose source table matches `table`, in registration order
    ///
    /// Exact key match only; a linear scan over the edge list, which is
    /// built once at startup and stays small.
    pub fn get_out_edges(&self, table: &TableKey) -> Vec<&EdgeConfig> {
        self.edges
            .iter()
            .filter(|edge| &edge.table_name == table)
            .collect()
    }

    /// Look up a registered function by name
    pub fn function(&self, name: &str) -> Option<&Arc<dyn ReactiveFn>> {
        self.functions.get(name)
    }

    /// Look up registered table metadata by qualified key
    pub fn table_metadata(&self, key: &TableKey) -> Option<&TableMetadata> {
        self.tables.get(key)
    }

    /// Names of every registered function, sorted
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every edge, in registration order
    pub fn edges(&self) -> &[EdgeConfig] {
        &self.edges
    }

    /// Check that every edge is bound to a registered table and function
    ///
    /// Must hold by the time the graph is used for dispatch; registration
    /// order may temporarily violate it while declarations are still running.
    pub fn validate(&self) -> Result<(), CoreError> {
        for edge in &self.edges {
            if !self.tables.contains_key(&edge.table_name) {
                return Err(CoreError::UnboundEdge(format!(
                    "edge {} -> {} references unregistered table {}",
                    edge.table_name, edge.fn_name, edge.table_name
                )));
            }
            if !self.functions.contains_key(&edge.fn_name) {
                return Err(CoreError::UnboundEdge(format!(
                    "edge {} -> {} references unregistered function {}",
                    edge.table_name, edge.fn_name, edge.fn_name
                )));
            }
        }
        Ok(())
    }

    /// Serializable snapshot of the registry for external consumers
    pub fn describe(&self) -> GraphDescription {
        let mut tables: Vec<TableMetadata> = self.tables.values().cloned().collect();
        tables.sort_by(|a, b| a.key().cmp(&b.key()));
        GraphDescription {
            tables,
            functions: self.function_names(),
            edges: self.edges.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::ExecutionContext;
    use crate::domain::events::TableEvent;

    fn noop(_event: &TableEvent, _ctx: &mut ExecutionContext) -> Result<(), CoreError> {
        Ok(())
    }

    #[test]
    fn test_register_table_returns_handle() {
        let mut graph = Graph::new();
        let orders = graph
            .register_table(TableMetadata::new("orders"))
            .unwrap();
        assert_eq!(orders.key(), &TableKey("orders".to_string()));
        assert!(graph.table_metadata(orders.key()).is_some());
    }

    #[test]
    fn test_duplicate_table_is_rejected() {
        let mut graph = Graph::new();
        graph.register_table(TableMetadata::new("orders")).unwrap();
        let err = graph
            .register_table(TableMetadata::new("orders"))
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateName("orders".to_string()));
    }

    #[test]
    fn test_namespaced_table_does_not_collide() {
        let mut graph = Graph::new();
        graph.register_table(TableMetadata::new("orders")).unwrap();
        graph
            .register_table(TableMetadata::new("orders").with_namespace("sales"))
            .unwrap();
    }

    #[test]
    fn test_duplicate_function_is_rejected_without_edge() {
        let mut graph = Graph::new();
        let orders = graph.register_table(TableMetadata::new("orders")).unwrap();
        graph.register_function("enrich", noop).unwrap();

        let err = graph.on_update(&orders, "enrich", noop).unwrap_err();
        assert_eq!(err, CoreError::DuplicateName("enrich".to_string()));
        // The failed binding must not leave a half-registered edge behind.
        assert!(graph.get_out_edges(orders.key()).is_empty());
    }

    #[test]
    fn test_on_update_registers_single_edge() {
        let mut graph = Graph::new();
        let orders = graph.register_table(TableMetadata::new("orders")).unwrap();
        graph.on_update(&orders, "enrich", noop).unwrap();

        let edges = graph.get_out_edges(orders.key());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].fn_name, "enrich");
        assert_eq!(edges[0].trigger_type, TriggerType::Update);
    }

    #[test]
    fn test_out_edges_preserve_registration_order() {
        let mut graph = Graph::new();
        let orders = graph.register_table(TableMetadata::new("orders")).unwrap();
        graph.on_update(&orders, "first", noop).unwrap();
        graph.on_new_records(&orders, "second", noop).unwrap();
        graph.on_update(&orders, "third", noop).unwrap();

        let names: Vec<&str> = graph
            .get_out_edges(orders.key())
            .iter()
            .map(|e| e.fn_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_bind_to_unknown_table_fails() {
        let mut graph = Graph::new();
        let ghost = TableRef(TableKey("ghost".to_string()));
        let err = graph.on_update(&ghost, "enrich", noop).unwrap_err();
        assert_eq!(err, CoreError::TableNotFound("ghost".to_string()));
    }

    #[test]
    fn test_validate_flags_unbound_edges() {
        let mut graph = Graph::new();
        graph.register_edge(TableKey("orders".to_string()), "enrich", TriggerType::Update);
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, CoreError::UnboundEdge(_)));

        graph.register_table(TableMetadata::new("orders")).unwrap();
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, CoreError::UnboundEdge(_)));

        graph.register_function("enrich", noop).unwrap();
        graph.validate().unwrap();
    }

    #[test]
    fn test_describe_is_serializable() {
        let mut graph = Graph::new();
        let orders = graph.register_table(TableMetadata::new("orders")).unwrap();
        graph.on_update(&orders, "enrich", noop).unwrap();

        let description = graph.describe();
        assert_eq!(description.functions, vec!["enrich".to_string()]);
        assert_eq!(description.edges.len(), 1);

        let serialized = serde_json::to_string(&description).unwrap();
        let deserialized: GraphDescription = serde_json::from_str(&serialized).unwrap();
        assert_eq!(description, deserialized);
    }

    #[test]
    fn test_trigger_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TriggerType::NewRecords).unwrap(),
            r#""new_records""#
        );
        assert_eq!(
            serde_json::to_string(&TriggerType::Update).unwrap(),
            r#""update""#
        );
    }
}
