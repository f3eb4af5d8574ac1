use thiserror::Error;

/// Core error type shared across anonymizer crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Store or persistence failure.
    #[error("store error: {0}")]
    Store(String),
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// The record type is not known to the store.
    #[error("unknown record type: {0}")]
    UnknownRecordType(String),
    /// The field is not declared by the record type.
    #[error("unknown field '{field}' on record type '{record_type}'")]
    UnknownField { record_type: String, field: String },
    /// A value does not match the declared field kind.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by anonymizer crates.
pub type Result<T> = std::result::Result<T, Error>;
