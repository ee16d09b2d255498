use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A single record flowing through the system
///
/// This is a wrapper around a JSON value with some helper methods
/// for working with record data in different formats.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Record {
    /// The inner JSON value
    pub value: serde_json::Value,
}

impl Record {
    /// Create a new record from a JSON value
    #[inline]
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Create a null record
    #[inline]
    pub fn null() -> Self {
        Self {
            value: serde_json::Value::Null,
        }
    }

    /// Get the inner JSON value
    #[inline]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Take ownership of the inner JSON value
    #[inline]
    pub fn into_value(self) -> serde_json::Value {
        self.value
    }

    /// Check if the record is null
    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Look up a top-level field by name
    #[inline]
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.value.get(field)
    }

    /// The top-level field names of the record, if it is an object
    pub fn field_names(&self) -> Vec<String> {
        match self.value.as_object() {
            Some(map) => map.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Try to convert the record to a specific type
    pub fn to<T>(&self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.value.clone())
    }

    /// Create a record from a serializable value
    pub fn from<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
    {
        Ok(Self::new(serde_json::to_value(value)?))
    }
}

impl From<serde_json::Value> for Record {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

/// An ordered batch of records accepted by a single append
///
/// `append` accepts either a lone record or a sequence of records; the
/// conversions here normalize a lone record into a one-element batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordBatch(pub Vec<Record>);

impl RecordBatch {
    /// Number of records in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch contains no records
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take ownership of the records
    #[inline]
    pub fn into_records(self) -> Vec<Record> {
        self.0
    }
}

impl From<Record> for RecordBatch {
    fn from(record: Record) -> Self {
        Self(vec![record])
    }
}

impl From<Vec<Record>> for RecordBatch {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl From<serde_json::Value> for RecordBatch {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => {
                Self(items.into_iter().map(Record::new).collect())
            }
            other => Self(vec![Record::new(other)]),
        }
    }
}

impl FromIterator<Record> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RecordBatch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A schema hint handed to the storage collaborator when a table is created
///
/// Schema inference and validation are the storage collaborator's concern;
/// the core only carries a declared field list, or infers one from the first
/// record of the creating batch.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaHint {
    /// Field names of the table, in declaration order
    pub fields: Vec<String>,
}

impl SchemaHint {
    /// Create a schema hint from declared field names
    pub fn declared<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Infer a schema hint from the first record of a batch
    pub fn infer(records: &[Record]) -> Self {
        let mut fields = records
            .first()
            .map(Record::field_names)
            .unwrap_or_default();
        fields.sort();
        Self { fields }
    }

    /// Whether the hint carries no field information
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
