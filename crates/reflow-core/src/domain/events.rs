use crate::domain::table::TableKey;
use crate::types::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of action a table experienced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableAction {
    /// Records were appended to the table
    Update,
}

/// Value object: event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a fresh event identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable notification that an action occurred on a table
///
/// Created by an append (carrying the appended batch) or injected by an
/// external trigger (carrying a payload, with no source table). Consumed
/// exactly once by the dispatcher; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEvent {
    /// Unique identifier of this event
    pub id: EventId,

    /// Key of the table that produced the event; `None` for external events
    pub table: Option<TableKey>,

    /// The action that occurred; `None` for external events
    pub action: Option<TableAction>,

    /// The batch appended by the originating `append` call, when any
    ///
    /// `NewRecords` consumers read this instead of re-reading the table.
    pub records: Option<Vec<Record>>,

    /// Arbitrary payload for externally injected events
    pub payload: Option<Record>,

    /// When the event was created
    pub occurred_at: DateTime<Utc>,
}

impl TableEvent {
    /// Event emitted when a table was updated by an append
    pub fn updated(table: TableKey, records: Vec<Record>) -> Self {
        Self {
            id: EventId::new(),
            table: Some(table),
            action: Some(TableAction::Update),
            records: Some(records),
            payload: None,
            occurred_at: Utc::now(),
        }
    }

    /// Externally injected event carrying a payload and no source table
    pub fn external(payload: Record) -> Self {
        Self {
            id: EventId::new(),
            table: None,
            action: None,
            records: None,
            payload: Some(payload),
            occurred_at: Utc::now(),
        }
    }

    /// The appended batch, empty if this event did not originate in an append
    pub fn new_records(&self) -> &[Record] {
        self.records.as_deref().unwrap_or_default()
    }
}

/// Ordered buffer of events emitted during a single function invocation
///
/// One sink exists per invocation; the dispatcher drains it after the
/// function returns. Scoping the sink to the invocation is what keeps
/// concurrent dispatches from observing each other's side effects.
#[derive(Debug, Default)]
pub struct EventSink {
    events: Vec<TableEvent>,
}

impl EventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn push(&mut self, event: TableEvent) {
        self.events.push(event);
    }

    /// Atomically take every pending event, leaving the sink empty
    pub fn drain(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the sink holds no pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
