//! Row decoding into [`ScalarValue`]s.
//!
//! # Architecture
//!
//! Decoding uses a two-phase approach:
//! 1. `TypeCategory` classifies the column type reported by the driver
//! 2. Backend-specific decoders extract the value for that category
//!
//! Values that have no natural scalar form (decimals, dates, byte
//! sequences, JSON) are rendered as strings. A decode failure on a numeric
//! column is returned to the caller as a scan failure; text-like columns
//! fall back to the raw bytes.

use crate::models::ScalarValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Binary,
    Json,
    Text,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    // Binary and spatial types, before integers ("point" contains "int")
    if lower.contains("blob")
        || lower.contains("binary")
        || lower == "bit"
        || lower.contains("geometry")
        || lower.contains("point")
        || lower.contains("polygon")
        || lower.contains("linestring")
    {
        return TypeCategory::Binary;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("int") {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "date" || lower == "time" || lower == "datetime" || lower == "timestamp" {
        return TypeCategory::Temporal;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    // varchar, text, char, enum, set, year, ...
    TypeCategory::Text
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Raw DECIMAL/NUMERIC value, preserving the exact server representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Row Decoding Trait
// =============================================================================

/// Decoding of backend rows into the crate's value model.
pub trait DecodeRow: Row {
    /// Column names in projection order.
    fn column_names(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Decode every column of the row.
    fn decode_values(&self) -> Result<Vec<ScalarValue>, sqlx::Error>;

    /// Decode a nullable text column.
    fn optional_text(&self, idx: usize) -> Result<Option<String>, sqlx::Error>;

    /// Decode a text column; NULL becomes an empty string.
    fn text(&self, idx: usize) -> Result<String, sqlx::Error> {
        Ok(self.optional_text(idx)?.unwrap_or_default())
    }
}

impl DecodeRow for MySqlRow {
    fn decode_values(&self) -> Result<Vec<ScalarValue>, sqlx::Error> {
        (0..self.len())
            .map(|idx| mysql::decode_column(self, idx))
            .collect()
    }

    fn optional_text(&self, idx: usize) -> Result<Option<String>, sqlx::Error> {
        mysql::optional_text(self, idx)
    }
}

impl DecodeRow for SqliteRow {
    fn decode_values(&self) -> Result<Vec<ScalarValue>, sqlx::Error> {
        (0..self.len())
            .map(|idx| sqlite::decode_column(self, idx))
            .collect()
    }

    fn optional_text(&self, idx: usize) -> Result<Option<String>, sqlx::Error> {
        self.try_get::<Option<String>, _>(idx)
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    pub fn decode_column(row: &MySqlRow, idx: usize) -> Result<ScalarValue, sqlx::Error> {
        if row.try_get_raw(idx)?.is_null() {
            return Ok(ScalarValue::Null);
        }

        let type_name = row.columns()[idx].type_info().name();
        match categorize_type(type_name) {
            TypeCategory::Integer => decode_integer(row, idx, type_name),
            TypeCategory::Boolean => Ok(ScalarValue::Boolean(row.try_get::<bool, _>(idx)?)),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Decimal => Ok(ScalarValue::String(row.try_get::<RawDecimal, _>(idx)?.0)),
            TypeCategory::Temporal => decode_temporal(row, idx, type_name),
            TypeCategory::Binary | TypeCategory::Json => decode_bytes(row, idx),
            TypeCategory::Text => Ok(optional_text(row, idx)?
                .map(ScalarValue::String)
                .unwrap_or(ScalarValue::Null)),
        }
    }

    fn decode_integer(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
    ) -> Result<ScalarValue, sqlx::Error> {
        if type_name.to_uppercase().contains("UNSIGNED") {
            return Ok(ScalarValue::from_unsigned(row.try_get::<u64, _>(idx)?));
        }
        Ok(ScalarValue::Integer(row.try_get::<i64, _>(idx)?))
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> Result<ScalarValue, sqlx::Error> {
        match row.try_get::<f64, _>(idx) {
            Ok(v) => Ok(ScalarValue::Float(v)),
            Err(_) => Ok(ScalarValue::Float(row.try_get::<f32, _>(idx)? as f64)),
        }
    }

    fn decode_temporal(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
    ) -> Result<ScalarValue, sqlx::Error> {
        let decoded = match type_name.to_uppercase().as_str() {
            "DATE" => row.try_get::<NaiveDate, _>(idx).map(|v| v.to_string()),
            "TIME" => row.try_get::<NaiveTime, _>(idx).map(|v| v.to_string()),
            _ => row.try_get::<NaiveDateTime, _>(idx).map(|v| v.to_string()),
        };
        match decoded {
            Ok(text) => Ok(ScalarValue::String(text)),
            // Zero dates and out-of-range TIME values keep their server text.
            Err(_) => decode_bytes(row, idx),
        }
    }

    fn decode_bytes(row: &MySqlRow, idx: usize) -> Result<ScalarValue, sqlx::Error> {
        let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
        Ok(ScalarValue::from_bytes(&bytes))
    }

    /// information_schema columns come back as VARBINARY on some servers,
    /// so text falls back to the raw bytes.
    pub fn optional_text(row: &MySqlRow, idx: usize) -> Result<Option<String>, sqlx::Error> {
        match row.try_get::<Option<String>, _>(idx) {
            Ok(v) => Ok(v),
            Err(sqlx::Error::ColumnDecode { .. }) => Ok(row
                .try_get_unchecked::<Option<Vec<u8>>, _>(idx)?
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => Err(e),
        }
    }
}

mod sqlite {
    use super::*;

    /// SQLite is dynamically typed: the storage class of the value decides
    /// the decoder, the declared column type only distinguishes booleans.
    pub fn decode_column(row: &SqliteRow, idx: usize) -> Result<ScalarValue, sqlx::Error> {
        let storage = {
            let raw = row.try_get_raw(idx)?;
            if raw.is_null() {
                return Ok(ScalarValue::Null);
            }
            raw.type_info().name().to_uppercase()
        };
        let declared = row.columns()[idx].type_info().name().to_uppercase();

        if storage.contains("INT") {
            let v = row.try_get_unchecked::<i64, _>(idx)?;
            if declared == "BOOLEAN" || declared == "BOOL" {
                return Ok(ScalarValue::Boolean(v != 0));
            }
            return Ok(ScalarValue::Integer(v));
        }
        if storage == "REAL" {
            return Ok(ScalarValue::Float(row.try_get_unchecked::<f64, _>(idx)?));
        }
        if storage == "BLOB" {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
            return Ok(ScalarValue::from_bytes(&bytes));
        }
        Ok(ScalarValue::String(
            row.try_get_unchecked::<String, _>(idx)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_integer() {
        assert_eq!(categorize_type("INT"), TypeCategory::Integer);
        assert_eq!(categorize_type("BIGINT UNSIGNED"), TypeCategory::Integer);
        assert_eq!(categorize_type("TINYINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("MEDIUMINT"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_boolean() {
        assert_eq!(categorize_type("BOOLEAN"), TypeCategory::Boolean);
    }

    #[test]
    fn test_categorize_decimal() {
        assert_eq!(categorize_type("DECIMAL"), TypeCategory::Decimal);
        assert_eq!(categorize_type("numeric"), TypeCategory::Decimal);
    }

    #[test]
    fn test_categorize_binary_before_integer() {
        assert_eq!(categorize_type("POINT"), TypeCategory::Binary);
        assert_eq!(categorize_type("VARBINARY"), TypeCategory::Binary);
        assert_eq!(categorize_type("LONGBLOB"), TypeCategory::Binary);
    }

    #[test]
    fn test_categorize_temporal() {
        assert_eq!(categorize_type("DATETIME"), TypeCategory::Temporal);
        assert_eq!(categorize_type("DATE"), TypeCategory::Temporal);
        assert_eq!(categorize_type("TIMESTAMP"), TypeCategory::Temporal);
    }

    #[test]
    fn test_categorize_text_fallback() {
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Text);
        assert_eq!(categorize_type("ENUM"), TypeCategory::Text);
        assert_eq!(categorize_type("YEAR"), TypeCategory::Text);
        assert_eq!(categorize_type("JSON"), TypeCategory::Json);
        assert_eq!(categorize_type("DOUBLE"), TypeCategory::Float);
    }
}
