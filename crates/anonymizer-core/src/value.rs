use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::{FieldKind, FieldSpec};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current or generated value of a record attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(value) => Some(*value),
            FieldValue::DateTime(value) => Some(value.date()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::DateTime(value) => Some(*value),
            FieldValue::Date(value) => value.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }

    /// Whether the value can be stored in a field of `kind`. `Null` fits all.
    pub fn fits(&self, kind: FieldKind) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(_) => kind == FieldKind::Boolean,
            FieldValue::Int(_) => kind.is_integer(),
            FieldValue::Decimal(_) => kind == FieldKind::Decimal,
            FieldValue::Text(_) => kind == FieldKind::Text,
            FieldValue::Date(_) => kind == FieldKind::Date,
            FieldValue::DateTime(_) => kind == FieldKind::DateTime,
        }
    }

    /// Parse a JSON value according to the field's kind.
    pub fn from_json(field: &FieldSpec, value: &Value) -> Result<Self> {
        let invalid = |message: String| Error::InvalidValue {
            field: field.name.clone(),
            message,
        };
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        match field.kind {
            FieldKind::Text => value
                .as_str()
                .map(FieldValue::text)
                .ok_or_else(|| invalid(format!("expected string, got {value}"))),
            FieldKind::Boolean => value
                .as_bool()
                .map(FieldValue::Bool)
                .ok_or_else(|| invalid(format!("expected bool, got {value}"))),
            FieldKind::Integer
            | FieldKind::PositiveInteger
            | FieldKind::SmallInteger
            | FieldKind::PositiveSmallInteger => value
                .as_i64()
                .map(FieldValue::Int)
                .ok_or_else(|| invalid(format!("expected integer, got {value}"))),
            FieldKind::Decimal => {
                let raw = match value {
                    Value::String(text) => text.clone(),
                    Value::Number(number) => number.to_string(),
                    other => return Err(invalid(format!("expected decimal, got {other}"))),
                };
                Decimal::from_str(&raw)
                    .map(FieldValue::Decimal)
                    .map_err(|err| invalid(format!("invalid decimal '{raw}': {err}")))
            }
            FieldKind::Date => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("expected date string, got {value}")))?;
                parse_date(raw)
                    .map(FieldValue::Date)
                    .ok_or_else(|| invalid(format!("invalid date '{raw}'")))
            }
            FieldKind::DateTime => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("expected datetime string, got {value}")))?;
                parse_datetime(raw)
                    .map(FieldValue::DateTime)
                    .ok_or_else(|| invalid(format!("invalid datetime '{raw}'")))
            }
        }
    }

    /// Parse a textual parameter according to the field's kind.
    pub fn parse_as(field: &FieldSpec, raw: &str) -> Result<Self> {
        let invalid = |what: &str| Error::InvalidValue {
            field: field.name.clone(),
            message: format!("invalid {what} '{raw}'"),
        };
        match field.kind {
            FieldKind::Text => Ok(FieldValue::text(raw)),
            FieldKind::Boolean => match raw.trim() {
                "true" => Ok(FieldValue::Bool(true)),
                "false" => Ok(FieldValue::Bool(false)),
                _ => Err(invalid("bool")),
            },
            FieldKind::Integer
            | FieldKind::PositiveInteger
            | FieldKind::SmallInteger
            | FieldKind::PositiveSmallInteger => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| invalid("integer")),
            FieldKind::Decimal => Decimal::from_str(raw.trim())
                .map(FieldValue::Decimal)
                .map_err(|_| invalid("decimal")),
            FieldKind::Date => parse_date(raw)
                .map(FieldValue::Date)
                .ok_or_else(|| invalid("date")),
            FieldKind::DateTime => parse_datetime(raw)
                .map(FieldValue::DateTime)
                .ok_or_else(|| invalid("datetime")),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(value) => Value::Bool(*value),
            FieldValue::Int(value) => Value::from(*value),
            // Kept as a string so the scale survives the round trip.
            FieldValue::Decimal(value) => Value::String(value.to_string()),
            FieldValue::Text(value) => Value::String(value.clone()),
            FieldValue::Date(value) => Value::String(value.format(DATE_FORMAT).to_string()),
            FieldValue::DateTime(value) => {
                Value::String(value.format(DATETIME_FORMAT).to_string())
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Decimal(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
            FieldValue::DateTime(value) => write!(f, "{}", value.format(DATETIME_FORMAT)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Accepts `T` or space separated timestamps with optional fractional
/// seconds, and bare dates at midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(value).and_then(|date| date.and_hms_opt(0, 0, 0)))
}
