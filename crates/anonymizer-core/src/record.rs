use std::collections::BTreeMap;
use std::fmt;

use crate::value::FieldValue;

/// Store-assigned handle of a record within its record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(pub usize);

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A loaded record: mutated in memory, written back through the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: String,
    key: RecordKey,
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(
        record_type: impl Into<String>,
        key: RecordKey,
        values: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            key,
            values,
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn key(&self) -> RecordKey {
        self.key
    }

    pub fn get(&self, attribute: &str) -> Option<&FieldValue> {
        self.values.get(attribute)
    }

    /// Replace an attribute, returning the previous value.
    pub fn set(&mut self, attribute: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(attribute.into(), value)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, FieldValue> {
        self.values
    }
}
