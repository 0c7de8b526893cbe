//! Schema introspection tools.
//!
//! This module implements the `list_databases`, `list_tables` and
//! `describe_table` MCP tools. Names supplied by the caller are bound as
//! query parameters, never interpolated into SQL.

use crate::db::Session;
use crate::db::schema::SchemaInspector;
use crate::error::DbResult;
use crate::models::ToolOutcome;
use crate::tools::format::{format_columns, format_databases, format_tables};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Database name
    pub database: String,
}

/// Input for the describe_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// Database name
    pub database: String,
    /// Table name
    pub table: String,
}

/// Handler for schema introspection tools.
pub struct SchemaToolHandler {
    session: Arc<Session>,
}

impl SchemaToolHandler {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Handle the list_databases tool call.
    pub async fn list_databases(&self) -> DbResult<ToolOutcome> {
        let pool = self.session.pool().await?;
        let databases = SchemaInspector::list_databases(&pool).await?;

        info!(
            tool = "list_databases",
            count = databases.len(),
            "List databases completed"
        );

        ToolOutcome::with_data(format_databases(&databases), &databases)
    }

    /// Handle the list_tables tool call.
    pub async fn list_tables(&self, input: ListTablesInput) -> DbResult<ToolOutcome> {
        let pool = self.session.pool().await?;
        let tables = SchemaInspector::list_tables(&pool, &input.database).await?;

        info!(
            tool = "list_tables",
            database = %input.database,
            count = tables.len(),
            "List tables completed"
        );

        ToolOutcome::with_data(format_tables(&input.database, &tables), &tables)
    }

    /// Handle the describe_table tool call.
    pub async fn describe_table(&self, input: DescribeTableInput) -> DbResult<ToolOutcome> {
        let pool = self.session.pool().await?;
        let columns = SchemaInspector::describe_table(&pool, &input.database, &input.table).await?;

        info!(
            tool = "describe_table",
            database = %input.database,
            table = %input.table,
            column_count = columns.len(),
            "Describe table completed"
        );

        ToolOutcome::with_data(
            format_columns(&input.database, &input.table, &columns),
            &columns,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    #[tokio::test]
    async fn test_requires_connection() {
        let handler = SchemaToolHandler::new(Arc::new(Session::default()));

        assert!(matches!(
            handler.list_databases().await.unwrap_err(),
            DbError::NotConnected
        ));
        assert!(matches!(
            handler
                .list_tables(ListTablesInput {
                    database: "main".to_string()
                })
                .await
                .unwrap_err(),
            DbError::NotConnected
        ));
        assert!(matches!(
            handler
                .describe_table(DescribeTableInput {
                    database: "main".to_string(),
                    table: "t".to_string(),
                })
                .await
                .unwrap_err(),
            DbError::NotConnected
        ));
    }

    #[tokio::test]
    async fn test_list_databases_payload_is_array() {
        let session = Arc::new(Session::default());
        session.connect("sqlite::memory:").await.unwrap();
        let handler = SchemaToolHandler::new(session);

        let outcome = handler.list_databases().await.unwrap();
        assert!(outcome.text.starts_with("Found 1 databases:\n"));
        assert_eq!(outcome.data, Some(serde_json::json!([{"name": "main"}])));
    }

    #[tokio::test]
    async fn test_empty_table_list_is_empty_array() {
        let session = Arc::new(Session::default());
        session.connect("sqlite::memory:").await.unwrap();
        let handler = SchemaToolHandler::new(session);

        let outcome = handler
            .list_tables(ListTablesInput {
                database: "main".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.text, "Found 0 tables in database 'main':\n");
        assert_eq!(outcome.data, Some(serde_json::json!([])));
    }
}
