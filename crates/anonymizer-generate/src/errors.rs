use thiserror::Error;

use anonymizer_core::{FieldKey, FieldValue};

/// Errors emitted while generating or constraining values.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing field metadata or parameter required by a generator.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot generate unique data for field {field}; last value tried {last_value:?}")]
    Exhausted {
        field: FieldKey,
        last_value: FieldValue,
    },
    #[error("store error: {0}")]
    Store(#[from] anonymizer_core::Error),
}
