use std::collections::BTreeMap;

use crate::PRIMARY_ID_FIELD;
use crate::error::{Error, Result};
use crate::record::{Record, RecordKey};
use crate::schema::RecordSchema;
use crate::value::FieldValue;

/// Read access to the values a field currently holds across all records.
pub trait ExistingValues {
    fn existing_values(&self, record_type: &str, field: &str) -> Result<Vec<FieldValue>>;
}

/// Query, schema and persistence collaborator used by policies.
pub trait RecordStore: ExistingValues {
    fn schema(&self, record_type: &str) -> Result<&RecordSchema>;

    /// Keys of every record of `record_type`, in iteration order.
    fn record_keys(&self, record_type: &str) -> Result<Vec<RecordKey>>;

    fn load(&self, record_type: &str, key: RecordKey) -> Result<Record>;

    fn persist(&mut self, record: Record) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Table {
    schema: RecordSchema,
    rows: Vec<BTreeMap<String, FieldValue>>,
}

/// Store holding every record type in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: BTreeMap<String, Table>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record_type(&mut self, schema: RecordSchema) -> Result<()> {
        if self.tables.contains_key(&schema.name) {
            return Err(Error::InvalidSchema(format!(
                "duplicate record type: {}",
                schema.name
            )));
        }
        self.tables.insert(
            schema.name.clone(),
            Table {
                schema,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Insert a record. Attributes left out are stored as `Null`.
    pub fn insert<I, K>(&mut self, record_type: &str, values: I) -> Result<RecordKey>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let table = self.table_mut(record_type)?;
        let mut row: BTreeMap<String, FieldValue> = table
            .schema
            .fields
            .iter()
            .map(|field| (field.name.clone(), FieldValue::Null))
            .collect();

        for (name, value) in values {
            let name = name.into();
            let field = table
                .schema
                .field(&name)
                .ok_or_else(|| Error::UnknownField {
                    record_type: record_type.to_string(),
                    field: name.clone(),
                })?;
            if !value.fits(field.kind) {
                return Err(Error::InvalidValue {
                    field: name,
                    message: format!("{value:?} does not fit kind {}", field.kind),
                });
            }
            row.insert(name, value);
        }

        table.rows.push(row);
        Ok(RecordKey(table.rows.len() - 1))
    }

    pub fn record_types(&self) -> impl Iterator<Item = &RecordSchema> {
        self.tables.values().map(|table| &table.schema)
    }

    /// Rows of a record type in insertion order.
    pub fn rows(&self, record_type: &str) -> Result<&[BTreeMap<String, FieldValue>]> {
        Ok(&self.table(record_type)?.rows)
    }

    fn table(&self, record_type: &str) -> Result<&Table> {
        self.tables
            .get(record_type)
            .ok_or_else(|| Error::UnknownRecordType(record_type.to_string()))
    }

    fn table_mut(&mut self, record_type: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(record_type)
            .ok_or_else(|| Error::UnknownRecordType(record_type.to_string()))
    }
}

impl ExistingValues for InMemoryStore {
    fn existing_values(&self, record_type: &str, field: &str) -> Result<Vec<FieldValue>> {
        let table = self.table(record_type)?;
        if !table.schema.has_field(field) {
            return Err(Error::UnknownField {
                record_type: record_type.to_string(),
                field: field.to_string(),
            });
        }
        Ok(table
            .rows
            .iter()
            .map(|row| row.get(field).cloned().unwrap_or(FieldValue::Null))
            .collect())
    }
}

impl RecordStore for InMemoryStore {
    fn schema(&self, record_type: &str) -> Result<&RecordSchema> {
        Ok(&self.table(record_type)?.schema)
    }

    /// Ordered by `id` when the record type declares one, otherwise by
    /// insertion order.
    fn record_keys(&self, record_type: &str) -> Result<Vec<RecordKey>> {
        let table = self.table(record_type)?;
        let mut keys: Vec<RecordKey> = (0..table.rows.len()).map(RecordKey).collect();
        if table.schema.has_field(PRIMARY_ID_FIELD) {
            keys.sort_by(|a, b| {
                let left = table.rows[a.0].get(PRIMARY_ID_FIELD);
                let right = table.rows[b.0].get(PRIMARY_ID_FIELD);
                left.cmp(&right).then(a.cmp(b))
            });
        }
        Ok(keys)
    }

    fn load(&self, record_type: &str, key: RecordKey) -> Result<Record> {
        let table = self.table(record_type)?;
        let row = table.rows.get(key.0).ok_or_else(|| {
            Error::Store(format!("record {key} not found in '{record_type}'"))
        })?;
        Ok(Record::new(record_type, key, row.clone()))
    }

    fn persist(&mut self, record: Record) -> Result<()> {
        let record_type = record.record_type().to_string();
        let key = record.key();
        let table = self.table_mut(&record_type)?;

        for (name, value) in record.values() {
            let field = table
                .schema
                .field(name)
                .ok_or_else(|| Error::UnknownField {
                    record_type: record_type.clone(),
                    field: name.clone(),
                })?;
            if !value.fits(field.kind) {
                return Err(Error::InvalidValue {
                    field: name.clone(),
                    message: format!("{value:?} does not fit kind {}", field.kind),
                });
            }
        }

        let slot = table.rows.get_mut(key.0).ok_or_else(|| {
            Error::Store(format!("record {key} not found in '{record_type}'"))
        })?;
        *slot = record.into_values();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn people() -> InMemoryStore {
        let schema = RecordSchema::new(
            "person",
            vec![FieldSpec::integer("id").unique(), FieldSpec::text("name")],
        )
        .expect("schema");
        let mut store = InMemoryStore::new();
        store.add_record_type(schema).expect("add type");
        for (id, name) in [(3, "Carol"), (1, "Alice"), (2, "Bob")] {
            store
                .insert(
                    "person",
                    [("id", FieldValue::Int(id)), ("name", FieldValue::from(name))],
                )
                .expect("insert");
        }
        store
    }

    #[test]
    fn record_keys_follow_primary_id() {
        let store = people();
        let keys = store.record_keys("person").expect("keys");
        let ids: Vec<_> = keys
            .iter()
            .map(|key| store.load("person", *key).expect("load"))
            .map(|record| record.get("id").and_then(FieldValue::as_i64))
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn persist_rejects_values_of_the_wrong_kind() {
        let mut store = people();
        let mut record = store.load("person", RecordKey(0)).expect("load");
        record.set("id", FieldValue::from("not a number"));
        let result = store.persist(record);
        assert!(matches!(result, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn insert_rejects_unknown_fields() {
        let mut store = people();
        let result = store.insert("person", [("email", FieldValue::from("a@b.c"))]);
        assert!(matches!(result, Err(Error::UnknownField { .. })));
    }
}
