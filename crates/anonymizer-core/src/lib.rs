//! Core contracts for the anonymizer.
//!
//! This crate defines the field metadata, value and record types shared by the
//! generation engine and the policies, plus the `RecordStore` collaborator
//! trait and an in-memory store backed by JSON datasets.

pub mod dataset;
pub mod error;
pub mod record;
pub mod schema;
pub mod store;
pub mod value;

pub use dataset::{Dataset, FieldDef, RecordTypeDef};
pub use error::{Error, Result};
pub use record::{Record, RecordKey};
pub use schema::{FieldKey, FieldKind, FieldSpec, RecordSchema};
pub use store::{ExistingValues, InMemoryStore, RecordStore};
pub use value::FieldValue;

/// Name of the attribute used to order records when a schema declares it.
pub const PRIMARY_ID_FIELD: &str = "id";
