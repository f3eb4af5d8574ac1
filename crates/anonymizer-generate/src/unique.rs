use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use anonymizer_core::{ExistingValues, FieldKey, FieldSpec, FieldValue};

use crate::errors::GenerationError;

/// Regeneration attempts allowed after the first collision on a unique field.
pub const MAX_UNIQUE_RETRIES: usize = 10;

/// Values already claimed by unique fields during one run.
///
/// A field's set is seeded from the store the first time the field is
/// constrained and only grows afterwards. `Null` is never tracked, matching
/// SQL unique semantics.
#[derive(Debug, Default)]
pub struct UniquenessRegistry {
    used: HashMap<FieldKey, HashSet<FieldValue>>,
}

impl UniquenessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeded(&self, key: &FieldKey) -> bool {
        self.used.contains_key(key)
    }

    pub fn used_values(&self, key: &FieldKey) -> Option<&HashSet<FieldValue>> {
        self.used.get(key)
    }

    fn seeded(
        &mut self,
        field: &FieldSpec,
        existing: &dyn ExistingValues,
    ) -> Result<&mut HashSet<FieldValue>, GenerationError> {
        let key = field.key();
        if !self.used.contains_key(&key) {
            let values: HashSet<FieldValue> = existing
                .existing_values(&field.record_type, &field.name)?
                .into_iter()
                .filter(|value| !value.is_null())
                .collect();
            debug!(field = %key, values = values.len(), "seeded uniqueness registry");
            self.used.insert(key.clone(), values);
        }
        Ok(self.used.entry(key).or_default())
    }

    /// Produce a value for `field` that honours its constraints.
    ///
    /// Without a field the candidate is returned untouched. Unique fields
    /// regenerate on collision up to [`MAX_UNIQUE_RETRIES`] times; the value
    /// is claimed before `max_length` truncation is applied.
    pub fn enforce<F>(
        &mut self,
        field: Option<&FieldSpec>,
        existing: &dyn ExistingValues,
        mut generate: F,
    ) -> Result<FieldValue, GenerationError>
    where
        F: FnMut() -> Result<FieldValue, GenerationError>,
    {
        let mut candidate = generate()?;
        let Some(field) = field else {
            return Ok(candidate);
        };

        if field.unique && !candidate.is_null() {
            let used = self.seeded(field, existing)?;
            for _ in 0..MAX_UNIQUE_RETRIES {
                if !used.contains(&candidate) {
                    break;
                }
                candidate = generate()?;
            }
            if used.contains(&candidate) {
                warn!(
                    field = %field.key(),
                    value = %candidate,
                    attempts = MAX_UNIQUE_RETRIES,
                    "unique generation exhausted"
                );
                return Err(GenerationError::Exhausted {
                    field: field.key(),
                    last_value: candidate,
                });
            }
            used.insert(candidate.clone());
        }

        if let Some(max_length) = field.max_length {
            candidate = truncate(candidate, max_length);
        }
        Ok(candidate)
    }
}

/// Cut text to at most `max_length` characters; other values pass through.
pub fn truncate(value: FieldValue, max_length: usize) -> FieldValue {
    match value {
        FieldValue::Text(text) if text.chars().count() > max_length => {
            FieldValue::Text(text.chars().take(max_length).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonymizer_core::{InMemoryStore, RecordSchema};

    fn store_with_names(names: &[&str]) -> InMemoryStore {
        let schema = RecordSchema::new(
            "person",
            vec![FieldSpec::text("name").with_max_length(4).unique()],
        )
        .expect("schema");
        let mut store = InMemoryStore::new();
        store.add_record_type(schema).expect("add type");
        for name in names {
            store
                .insert("person", [("name", FieldValue::from(*name))])
                .expect("insert");
        }
        store
    }

    fn name_field(store: &InMemoryStore) -> FieldSpec {
        use anonymizer_core::RecordStore;
        store
            .schema("person")
            .ok()
            .and_then(|schema| schema.field("name").cloned())
            .expect("name field")
    }

    #[test]
    fn collision_with_only_value_exhausts_after_ten_retries() {
        let store = store_with_names(&["same"]);
        let field = name_field(&store);
        let mut registry = UniquenessRegistry::new();
        let mut calls = 0;

        let result = registry.enforce(Some(&field), &store, || {
            calls += 1;
            Ok(FieldValue::from("same"))
        });

        assert!(matches!(
            result,
            Err(GenerationError::Exhausted { ref last_value, .. }) if *last_value == FieldValue::from("same")
        ));
        assert_eq!(calls, MAX_UNIQUE_RETRIES + 1);
    }

    #[test]
    fn regenerates_until_free_value_found() {
        let store = store_with_names(&["aaaa", "bbbb"]);
        let field = name_field(&store);
        let mut registry = UniquenessRegistry::new();
        let mut queue = vec!["cccc", "bbbb", "aaaa"];

        let value = registry
            .enforce(Some(&field), &store, || {
                Ok(FieldValue::from(queue.pop().unwrap_or("zzzz")))
            })
            .expect("unique value");

        assert_eq!(value, FieldValue::from("cccc"));
        let used = registry.used_values(&field.key()).expect("seeded");
        assert!(used.contains(&FieldValue::from("cccc")));
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn uniqueness_is_checked_before_truncation() {
        let store = store_with_names(&[]);
        let field = name_field(&store);
        let mut registry = UniquenessRegistry::new();

        let first = registry
            .enforce(Some(&field), &store, || Ok(FieldValue::from("abcdef")))
            .expect("first");
        let second = registry
            .enforce(Some(&field), &store, || Ok(FieldValue::from("abcdxy")))
            .expect("second");

        assert_eq!(first, FieldValue::from("abcd"));
        assert_eq!(second, FieldValue::from("abcd"));
    }

    #[test]
    fn without_field_nothing_is_enforced() {
        let store = store_with_names(&["same"]);
        let mut registry = UniquenessRegistry::new();
        let value = registry
            .enforce(None, &store, || Ok(FieldValue::from("same but long")))
            .expect("value");
        assert_eq!(value, FieldValue::from("same but long"));
        assert!(!registry.is_seeded(&FieldKey {
            record_type: "person".to_string(),
            field: "name".to_string(),
        }));
    }
}
