//! Value generation engine for the anonymizer.
//!
//! Generators produce fake values per semantic kind, the uniqueness registry
//! enforces per-field constraints, and [`Faker`] ties both to one run's RNG,
//! locale and clock.

pub mod errors;
pub mod faker;
pub mod faker_rs;
pub mod generators;
pub mod unique;

pub use errors::GenerationError;
pub use faker::Faker;
pub use faker_rs::{FakerKind, LocaleKey};
pub use unique::{MAX_UNIQUE_RETRIES, UniquenessRegistry};
