//! Output formatting utilities for MCP tools.
//!
//! Every successful tool call is projected twice: a plain-text rendering for
//! the display text and a structured payload. This module owns both, so the
//! handlers only fetch data and pick a projection.

use crate::models::{
    ColumnInfo, DatabaseInfo, DatabaseType, TableInfo, TabularResult, WriteSummary,
};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Display width of a result table cell.
const CELL_WIDTH: usize = 20;
/// Separator between result table cells.
const CELL_SEPARATOR: &str = " | ";
/// Rule characters per result column.
const RULE_PER_COLUMN: usize = 23;
/// Rule width under the describe_table header.
const DESCRIBE_RULE_WIDTH: usize = 80;

/// Structured payload of the read path.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    /// Rows as column -> value maps, in projection order
    pub rows: Vec<Map<String, JsonValue>>,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<&TabularResult> for QueryPayload {
    fn from(result: &TabularResult) -> Self {
        Self {
            rows: result.row_maps(),
            row_count: result.row_count(),
            columns: result.columns.clone(),
        }
    }
}

/// Structured payload of the mutate path.
#[derive(Debug, Clone, Copy, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WritePayload {
    pub rows_affected: u64,
    /// -1 when the statement generated no id
    pub last_insert_id: i64,
}

impl From<&WriteSummary> for WritePayload {
    fn from(summary: &WriteSummary) -> Self {
        Self {
            rows_affected: summary.rows_affected,
            last_insert_id: summary.last_insert_id.unwrap_or(-1),
        }
    }
}

/// Left-align `value` in a field of `width` display columns.
///
/// Values wider than the field are kept whole.
pub fn pad_right(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(value.width());
    let mut out = String::with_capacity(value.len() + fill);
    out.push_str(value);
    out.extend(std::iter::repeat_n(' ', fill));
    out
}

pub fn format_connected(db_type: DatabaseType) -> String {
    format!("Successfully connected to {} database", db_type.display_name())
}

pub fn format_databases(databases: &[DatabaseInfo]) -> String {
    let mut out = format!("Found {} databases:\n", databases.len());
    for db in databases {
        let _ = writeln!(out, "- {}", db.name);
    }
    out
}

pub fn format_tables(database: &str, tables: &[TableInfo]) -> String {
    let mut out = format!("Found {} tables in database '{}':\n", tables.len(), database);
    for table in tables {
        let _ = writeln!(out, "- {} ({})", table.table_name, table.table_type);
    }
    out
}

pub fn format_columns(database: &str, table: &str, columns: &[ColumnInfo]) -> String {
    let mut out = format!(
        "Table '{}.{}' has {} columns:\n\n",
        database,
        table,
        columns.len()
    );
    push_column_line(&mut out, "Column", "Type", "Nullable", "Default", "Extra");
    out.push_str(&"-".repeat(DESCRIBE_RULE_WIDTH));
    out.push('\n');

    for col in columns {
        push_column_line(
            &mut out,
            &col.column_name,
            &col.data_type,
            &col.is_nullable,
            col.column_default.as_deref().unwrap_or("NULL"),
            &col.extra,
        );
    }
    out
}

fn push_column_line(
    out: &mut String,
    name: &str,
    data_type: &str,
    nullable: &str,
    default: &str,
    extra: &str,
) {
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        pad_right(name, 20),
        pad_right(data_type, 15),
        pad_right(nullable, 10),
        pad_right(default, 15),
        extra
    );
}

/// Render read-path rows. The table is omitted when there are no rows.
pub fn format_query_result(result: &TabularResult) -> String {
    let mut out = format!(
        "Query executed successfully. Returned {} rows:\n\n",
        result.row_count()
    );
    if result.rows.is_empty() {
        return out;
    }

    push_cells(&mut out, result.columns.iter().map(String::as_str));
    out.push_str(&"-".repeat(result.columns.len() * RULE_PER_COLUMN));
    out.push('\n');

    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        push_cells(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn push_cells<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line = cells
        .map(|cell| pad_right(cell, CELL_WIDTH))
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR);
    out.push_str(&line);
    out.push('\n');
}

pub fn format_write_summary(summary: &WriteSummary) -> String {
    let mut out = format!(
        "Query executed successfully.\nRows affected: {}",
        summary.rows_affected
    );
    if let Some(id) = summary.last_insert_id {
        let _ = write!(out, "\nLast insert ID: {}", id);
    }
    out
}
