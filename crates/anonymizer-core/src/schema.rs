use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::FieldValue;

/// Largest scale supported by `rust_decimal`.
const MAX_DECIMAL_PLACES: u32 = 28;

/// Semantic kind of a record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    PositiveInteger,
    SmallInteger,
    PositiveSmallInteger,
    Boolean,
    Date,
    DateTime,
    Decimal,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::PositiveInteger => "positive_integer",
            Self::SmallInteger => "small_integer",
            Self::PositiveSmallInteger => "positive_small_integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Decimal => "decimal",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::PositiveInteger | Self::SmallInteger | Self::PositiveSmallInteger
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a field across record types, used to key uniqueness state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub record_type: String,
    pub field: String,
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.record_type, self.field)
    }
}

/// Metadata for one attribute of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    /// Owning record type; filled in by [`RecordSchema::new`].
    pub record_type: String,
    pub kind: FieldKind,
    pub max_length: Option<usize>,
    pub decimal_places: Option<u32>,
    pub choices: Option<Vec<FieldValue>>,
    pub unique: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            record_type: String::new(),
            kind,
            max_length: None,
            decimal_places: None,
            choices: None,
            unique: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn decimal(name: impl Into<String>, decimal_places: u32) -> Self {
        Self::new(name, FieldKind::Decimal).with_decimal_places(decimal_places)
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_decimal_places(mut self, decimal_places: u32) -> Self {
        self.decimal_places = Some(decimal_places);
        self
    }

    pub fn with_choices(mut self, choices: Vec<FieldValue>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn key(&self) -> FieldKey {
        FieldKey {
            record_type: self.record_type.clone(),
            field: self.name.clone(),
        }
    }
}

/// Ordered field list of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Build a schema, stamping each field with the record type name.
    ///
    /// Fails on duplicate field names, decimal scales beyond what
    /// `rust_decimal` supports and choices that do not match the field kind.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        let name = name.into();
        let mut seen = BTreeSet::new();
        let mut stamped = Vec::with_capacity(fields.len());

        for mut field in fields {
            if !seen.insert(field.name.clone()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate field name: {}.{}",
                    name, field.name
                )));
            }
            if let Some(places) = field.decimal_places
                && places > MAX_DECIMAL_PLACES
            {
                return Err(Error::InvalidSchema(format!(
                    "decimal_places for {}.{} must be <= {MAX_DECIMAL_PLACES}",
                    name, field.name
                )));
            }
            if let Some(choices) = &field.choices {
                for choice in choices {
                    if !choice.fits(field.kind) {
                        return Err(Error::InvalidSchema(format!(
                            "choice {choice:?} does not match kind {} of {}.{}",
                            field.kind, name, field.name
                        )));
                    }
                }
            }
            field.record_type = name.clone();
            stamped.push(field);
        }

        Ok(Self {
            name,
            fields: stamped,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> BTreeSet<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}
