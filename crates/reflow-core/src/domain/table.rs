use crate::types::SchemaHint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value object: qualified table key
///
/// Renders as `namespace.name` when the table carries a namespace, else as
/// the bare name. Two tables with the same key are the same logical table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey(pub String);

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TableKey {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TableKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&TableRef> for TableKey {
    fn from(table: &TableRef) -> Self {
        table.0.clone()
    }
}

/// Identity of a table: name, optional namespace, optional declared schema
///
/// Immutable once created. Registration inserts it into the graph registry
/// keyed by [`TableMetadata::key`]; performs no I/O.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableMetadata {
    /// Name of the table, unique within its namespace
    pub name: String,

    /// Optional namespace qualifying the name
    pub namespace: Option<String>,

    /// Optional declared schema; inferred from the first append otherwise
    pub schema: Option<SchemaHint>,
}

impl TableMetadata {
    /// Create metadata for a table with no namespace and no declared schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            schema: None,
        }
    }

    /// Qualify the table with a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Declare the table schema up front
    pub fn with_schema(mut self, schema: SchemaHint) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The qualified key identifying this table in a graph and in storage
    pub fn key(&self) -> TableKey {
        match &self.namespace {
            Some(namespace) => TableKey(format!("{}.{}", namespace, self.name)),
            None => TableKey(self.name.clone()),
        }
    }
}

/// Value object: handle returned by table registration
///
/// Proves the table was registered and names it without holding a borrow of
/// the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef(pub TableKey);

impl TableRef {
    /// The qualified key of the registered table
    pub fn key(&self) -> &TableKey {
        &self.0
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
