//! Schema-related data models.
//!
//! These are the typed records returned by `list_databases`, `list_tables`
//! and `describe_table`. They serialize with the field names the tools
//! expose in their structured payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A database (schema) on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseInfo {
    pub name: String,
}

/// A table or view inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableInfo {
    pub table_name: String,
    /// "BASE TABLE", "VIEW", "SYSTEM VIEW", ...
    pub table_type: String,
    pub table_schema: String,
}

/// A column of a table, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    /// "YES" or "NO"
    pub is_nullable: String,
    /// None when the column has no default (serialized as null)
    pub column_default: Option<String>,
    /// e.g., "auto_increment"
    pub extra: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_info_null_default_serializes_as_null() {
        let col = ColumnInfo {
            column_name: "note".to_string(),
            data_type: "text".to_string(),
            is_nullable: "YES".to_string(),
            column_default: None,
            extra: String::new(),
        };
        let json = serde_json::to_value(&col).unwrap();
        assert!(json["column_default"].is_null());
        assert_eq!(json["is_nullable"], "YES");
    }

    #[test]
    fn test_table_info_field_names() {
        let table = TableInfo {
            table_name: "users".to_string(),
            table_type: "BASE TABLE".to_string(),
            table_schema: "shop".to_string(),
        };
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"table_name\":\"users\""));
        assert!(json.contains("\"table_type\":\"BASE TABLE\""));
        assert!(json.contains("\"table_schema\":\"shop\""));
    }
}
