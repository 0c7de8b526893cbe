//! Result value models.
//!
//! Rows coming back from the read path are decoded into [`ScalarValue`]s and
//! collected into a [`TabularResult`]; the mutate path produces a
//! [`WriteSummary`].

use serde::{Serialize, Serializer};
use std::fmt;

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ScalarValue {
    /// Normalize a byte sequence (BLOB, BINARY, JSON, ...) into a string value.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::String(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Convert an unsigned integer, falling back to its text when it does not fit `i64`.
    pub fn from_unsigned(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self::Integer(v),
            Err(_) => Self::String(value.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Text form used in display tables; nulls render as `NULL`.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::String(s) => f.write_str(s),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
        }
    }
}

/// Rows of a read query, each aligned with `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    /// Column names in projection order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<ScalarValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows as ordered column -> value maps.
    pub fn row_maps(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| (col.clone(), scalar_to_json(value)))
                    .collect()
            })
            .collect()
    }
}

fn scalar_to_json(value: &ScalarValue) -> serde_json::Value {
    match value {
        ScalarValue::Null => serde_json::Value::Null,
        ScalarValue::String(s) => serde_json::Value::String(s.clone()),
        ScalarValue::Integer(v) => serde_json::Value::Number((*v).into()),
        ScalarValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(v.to_string())),
        ScalarValue::Boolean(v) => serde_json::Value::Bool(*v),
    }
}

/// Effect of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows_affected: u64,
    /// None when the statement generated no id.
    pub last_insert_id: Option<i64>,
}
