use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::schema::{FieldKind, FieldSpec, RecordSchema};
use crate::store::{InMemoryStore, RecordStore};
use crate::value::FieldValue;

/// JSON document describing record types and their records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub record_types: Vec<RecordTypeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordTypeDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub records: Vec<Map<String, Value>>,
}

/// Serialized form of a [`FieldSpec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(default)]
    pub unique: bool,
}

impl FieldDef {
    fn to_spec(&self) -> Result<FieldSpec> {
        let mut spec = FieldSpec::new(self.name.clone(), self.kind);
        spec.max_length = self.max_length;
        spec.decimal_places = self.decimal_places;
        spec.unique = self.unique;
        if let Some(choices) = &self.choices {
            let parsed = choices
                .iter()
                .map(|choice| FieldValue::from_json(&spec, choice))
                .collect::<Result<Vec<_>>>()?;
            spec.choices = Some(parsed);
        }
        Ok(spec)
    }

    fn from_spec(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name.clone(),
            kind: spec.kind,
            max_length: spec.max_length,
            decimal_places: spec.decimal_places,
            choices: spec
                .choices
                .as_ref()
                .map(|choices| choices.iter().map(FieldValue::to_json).collect()),
            unique: spec.unique,
        }
    }
}

impl Dataset {
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn into_store(self) -> Result<InMemoryStore> {
        let mut store = InMemoryStore::new();
        for def in self.record_types {
            let fields = def
                .fields
                .iter()
                .map(FieldDef::to_spec)
                .collect::<Result<Vec<_>>>()?;
            let schema = RecordSchema::new(def.name.clone(), fields)?;

            let mut rows = Vec::with_capacity(def.records.len());
            for raw in &def.records {
                let mut row = Vec::with_capacity(raw.len());
                for (name, value) in raw {
                    let field = schema.field(name).ok_or_else(|| Error::UnknownField {
                        record_type: def.name.clone(),
                        field: name.clone(),
                    })?;
                    row.push((name.clone(), FieldValue::from_json(field, value)?));
                }
                rows.push(row);
            }

            store.add_record_type(schema)?;
            for row in rows {
                store.insert(&def.name, row)?;
            }
        }
        Ok(store)
    }

    /// Snapshot a store. Records keep insertion order.
    pub fn from_store(store: &InMemoryStore) -> Result<Self> {
        let mut record_types = Vec::new();
        for schema in store.record_types() {
            let records = store
                .rows(&schema.name)?
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(name, value)| (name.clone(), value.to_json()))
                        .collect::<Map<String, Value>>()
                })
                .collect();
            record_types.push(RecordTypeDef {
                name: schema.name.clone(),
                fields: schema.fields.iter().map(FieldDef::from_spec).collect(),
                records,
            });
        }
        Ok(Self { record_types })
    }
}

impl InMemoryStore {
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        dataset.into_store()
    }

    /// Number of records of a type, for reporting.
    pub fn record_count(&self, record_type: &str) -> Result<usize> {
        Ok(self.record_keys(record_type)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dataset_round_trips_through_store() {
        let document = json!({
            "record_types": [{
                "name": "invoice",
                "fields": [
                    {"name": "id", "kind": "integer", "unique": true},
                    {"name": "amount", "kind": "decimal", "decimal_places": 2},
                    {"name": "issued", "kind": "date"},
                    {"name": "status", "kind": "text", "choices": ["open", "paid"]}
                ],
                "records": [
                    {"id": 1, "amount": "12.50", "issued": "2023-04-01", "status": "open"}
                ]
            }]
        });
        let dataset: Dataset = serde_json::from_value(document).expect("parse dataset");
        let store = dataset.into_store().expect("build store");

        let schema = store.schema("invoice").expect("schema");
        assert_eq!(schema.field("status").and_then(|f| f.choices.as_ref()).map(Vec::len), Some(2));

        let snapshot = Dataset::from_store(&store).expect("snapshot");
        let record = &snapshot.record_types[0].records[0];
        assert_eq!(record.get("amount"), Some(&json!("12.50")));
        assert_eq!(record.get("issued"), Some(&json!("2023-04-01")));
    }

    #[test]
    fn dataset_rejects_mistyped_values() {
        let document = json!({
            "record_types": [{
                "name": "person",
                "fields": [{"name": "age", "kind": "integer"}],
                "records": [{"age": "forty"}]
            }]
        });
        let dataset: Dataset = serde_json::from_value(document).expect("parse dataset");
        assert!(matches!(
            dataset.into_store(),
            Err(Error::InvalidValue { .. })
        ));
    }
}
