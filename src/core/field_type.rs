use crate::core::{PersistenceError, Result, Value, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported admin field types. Each property's metadata names one of these,
/// which drives parsing of submitted string values, display decoration and
/// restriction selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Id,
    Integer,
    Decimal,
    Money,
    Boolean,
    String,
    Date,
    ForeignKey,
}

impl FieldType {
    /// Parse a submitted wire string into a typed value. Empty strings parse
    /// to NULL for every type.
    pub fn parse_value(&self, raw: &str) -> Result<Value> {
        if raw.is_empty() {
            return Ok(Value::Null);
        }
        match self {
            Self::String => Ok(Value::Text(raw.to_string())),
            Self::Id | Self::ForeignKey => {
                // Numeric ids stay comparable; generated ids are opaque text
                Ok(raw
                    .parse::<i64>()
                    .map(Value::Integer)
                    .unwrap_or_else(|_| Value::Text(raw.to_string())))
            }
            Self::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
                PersistenceError::TypeMismatch(format!("'{}' is not an integer", raw))
            }),
            Self::Decimal | Self::Money => raw.parse::<f64>().map(Value::Decimal).map_err(|_| {
                PersistenceError::TypeMismatch(format!("'{}' is not a decimal", raw))
            }),
            Self::Boolean => match raw {
                "true" | "TRUE" | "Y" | "y" | "1" => Ok(Value::Boolean(true)),
                "false" | "FALSE" | "N" | "n" | "0" => Ok(Value::Boolean(false)),
                _ => Err(PersistenceError::TypeMismatch(format!(
                    "'{}' is not a boolean",
                    raw
                ))),
            },
            Self::Date => parse_date(raw).map(Value::DateTime),
        }
    }

    /// Format a typed value for display in the admin list grid.
    pub fn format_value(&self, value: &Value) -> String {
        match (self, value) {
            (_, Value::Null) => String::new(),
            (Self::Money, v) => match v.as_f64() {
                Some(f) => format!("{:.2}", f),
                None => v.to_string(),
            },
            (Self::Boolean, Value::Boolean(b)) => {
                if *b { "true".into() } else { "false".into() }
            }
            (Self::Date, Value::DateTime(d)) => d.format(DATE_FORMAT).to_string(),
            (_, v) => v.to_string(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Money)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(PersistenceError::TypeMismatch(format!(
        "'{}' is not a date (expected {} or %Y-%m-%d)",
        raw, DATE_FORMAT
    )))
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Id => "ID",
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
            Self::Money => "MONEY",
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::Date => "DATE",
            Self::ForeignKey => "FOREIGN_KEY",
        };
        write!(f, "{}", name)
    }
}
