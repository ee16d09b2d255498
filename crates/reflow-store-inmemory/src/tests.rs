use crate::InMemoryTableStore;
use pretty_assertions::assert_eq;
use reflow_core::{
    CoreError, ExecutionContext, Graph, Record, Runtime, SchemaHint, StoreError, TableEvent,
    TableKey, TableMetadata, TableStore,
};
use serde_json::json;
use std::sync::Arc;

fn key(name: &str) -> TableKey {
    TableKey::from(name)
}

#[test]
fn test_create_append_read_roundtrip() -> Result<(), StoreError> {
    let store = InMemoryTableStore::new();
    let orders = key("orders");

    assert!(!store.exists(&orders));
    store.create(&orders, &SchemaHint::declared(["id"]), &[])?;
    assert!(store.exists(&orders));

    store.append(&orders, &[Record::new(json!({"id": 1}))])?;
    store.append(&orders, &[Record::new(json!({"id": 2}))])?;

    let records = store.read(&orders)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].as_value()["id"], 1);
    assert_eq!(records[1].as_value()["id"], 2);

    Ok(())
}

#[test]
fn test_create_twice_fails() {
    let store = InMemoryTableStore::new();
    let orders = key("orders");

    store
        .create(&orders, &SchemaHint::default(), &[])
        .unwrap();
    let err = store.create(&orders, &SchemaHint::default(), &[]).unwrap_err();
    assert_eq!(err, StoreError::AlreadyExists("orders".to_string()));
}

#[test]
fn test_append_to_missing_table_fails() {
    let store = InMemoryTableStore::new();
    let err = store
        .append(&key("ghost"), &[Record::null()])
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound("ghost".to_string()));
}

#[test]
fn test_read_of_missing_table_is_empty() {
    let store = InMemoryTableStore::new();
    assert!(store.read(&key("ghost")).unwrap().is_empty());
}

#[test]
fn test_sample_is_not_written_on_create() {
    let store = InMemoryTableStore::new();
    let orders = key("orders");
    store
        .create(
            &orders,
            &SchemaHint::declared(["id"]),
            &[Record::new(json!({"id": 1}))],
        )
        .unwrap();
    assert!(store.read(&orders).unwrap().is_empty());
    assert_eq!(store.record_count(&orders), 0);
}

#[test]
fn test_schema_and_table_names_are_exposed() {
    let store = InMemoryTableStore::new();
    store
        .create(&key("b"), &SchemaHint::declared(["x"]), &[])
        .unwrap();
    store.create(&key("a"), &SchemaHint::default(), &[]).unwrap();

    assert_eq!(store.table_names(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        store.schema(&key("b")).unwrap().fields,
        vec!["x".to_string()]
    );
    assert!(store.schema(&key("ghost")).is_none());
}

#[test]
fn test_runtime_cascade_over_in_memory_store() {
    let mut graph = Graph::new();
    let mentions = graph
        .register_table(TableMetadata::new("mentions"))
        .unwrap();
    graph.register_table(TableMetadata::new("replies")).unwrap();

    graph
        .register_function(
            "ingest",
            |event: &TableEvent, ctx: &mut ExecutionContext| -> Result<(), CoreError> {
                let payload = event.payload.clone().unwrap_or_else(Record::null);
                ctx.table("mentions")?.append(payload)?;
                Ok(())
            },
        )
        .unwrap();
    graph
        .on_new_records(
            &mentions,
            "reply",
            |event: &TableEvent, ctx: &mut ExecutionContext| -> Result<(), CoreError> {
                for record in event.new_records() {
                    let user = record
                        .get("user")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown");
                    ctx.table("replies")?
                        .append(Record::new(json!({"to": user})))?;
                }
                Ok(())
            },
        )
        .unwrap();

    let store = Arc::new(InMemoryTableStore::new());
    let runtime = Runtime::new(graph, store.clone()).unwrap();

    runtime
        .trigger(
            "ingest",
            TableEvent::external(Record::new(json!({"user": "ada"}))),
        )
        .unwrap();

    let replies = runtime.read("replies").unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].as_value()["to"], "ada");

    // The store saw both tables materialize, with inferred schemas.
    assert_eq!(
        store.table_names(),
        vec!["mentions".to_string(), "replies".to_string()]
    );
    assert_eq!(
        store.schema(&key("mentions")).unwrap().fields,
        vec!["user".to_string()]
    );
}

#[test]
fn test_declared_schema_wins_over_inference() {
    let mut graph = Graph::new();
    graph
        .register_table(
            TableMetadata::new("orders").with_schema(SchemaHint::declared(["id", "total"])),
        )
        .unwrap();
    graph
        .register_function(
            "seed",
            |_event: &TableEvent, ctx: &mut ExecutionContext| -> Result<(), CoreError> {
                ctx.table("orders")?
                    .append(Record::new(json!({"id": 1})))?;
                Ok(())
            },
        )
        .unwrap();

    let store = Arc::new(InMemoryTableStore::new());
    let runtime = Runtime::new(graph, store.clone()).unwrap();
    runtime
        .trigger("seed", TableEvent::external(Record::null()))
        .unwrap();

    assert_eq!(
        store.schema(&key("orders")).unwrap().fields,
        vec!["id".to_string(), "total".to_string()]
    );
}

#[test]
fn test_namespaced_tables_store_under_qualified_key() {
    let mut graph = Graph::new();
    graph
        .register_table(TableMetadata::new("orders").with_namespace("sales"))
        .unwrap();
    graph
        .register_function(
            "seed",
            |_event: &TableEvent, ctx: &mut ExecutionContext| -> Result<(), CoreError> {
                ctx.table("sales.orders")?
                    .append(Record::new(json!({"id": 1})))?;
                Ok(())
            },
        )
        .unwrap();

    let store = Arc::new(InMemoryTableStore::new());
    let runtime = Runtime::new(graph, store.clone()).unwrap();
    runtime
        .trigger("seed", TableEvent::external(Record::null()))
        .unwrap();

    assert_eq!(store.table_names(), vec!["sales.orders".to_string()]);
    assert_eq!(runtime.read("sales.orders").unwrap().len(), 1);
}
