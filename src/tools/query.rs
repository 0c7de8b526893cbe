//! Query execution tool.
//!
//! This module implements the `execute_query` MCP tool. The classifier picks
//! the execution path; read statements come back as a table, everything else
//! reports affected rows and the generated id.

use crate::db::{QueryExecutor, Session};
use crate::error::{DbError, DbResult};
use crate::models::ToolOutcome;
use crate::tools::classifier::{QueryClassifier, StatementKind};
use crate::tools::format::{QueryPayload, WritePayload, format_query_result, format_write_summary};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL query to execute
    pub query: String,
}

/// Handler for query execution.
pub struct QueryToolHandler {
    session: Arc<Session>,
    classifier: Arc<dyn QueryClassifier>,
    executor: QueryExecutor,
}

impl QueryToolHandler {
    pub fn new(session: Arc<Session>, classifier: Arc<dyn QueryClassifier>) -> Self {
        Self {
            session,
            classifier,
            executor: QueryExecutor::new(),
        }
    }

    /// Handle the execute_query tool call.
    ///
    /// The connection check comes first, so an empty query on a
    /// disconnected session reports the missing connection.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> DbResult<ToolOutcome> {
        let pool = self.session.pool().await?;

        let sql = input.query.trim();
        if sql.is_empty() {
            return Err(DbError::invalid_input("Query cannot be empty"));
        }

        match self.classifier.classify(sql) {
            StatementKind::Read => {
                let result = self.executor.execute_query(&pool, sql).await?;
                info!(
                    tool = "execute_query",
                    path = "read",
                    row_count = result.row_count(),
                    "Query executed"
                );
                ToolOutcome::with_data(format_query_result(&result), &QueryPayload::from(&result))
            }
            StatementKind::Mutate => {
                let summary = self.executor.execute_write(&pool, sql).await?;
                info!(
                    tool = "execute_query",
                    path = "mutate",
                    rows_affected = summary.rows_affected,
                    "Query executed"
                );
                ToolOutcome::with_data(
                    format_write_summary(&summary),
                    &WritePayload::from(&summary),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::classifier::PrefixClassifier;

    async fn connected_handler() -> QueryToolHandler {
        let session = Arc::new(Session::default());
        session.connect("sqlite::memory:").await.unwrap();
        QueryToolHandler::new(session, Arc::new(PrefixClassifier))
    }

    fn input(query: &str) -> ExecuteQueryInput {
        ExecuteQueryInput {
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_not_connected_before_empty_check() {
        let handler =
            QueryToolHandler::new(Arc::new(Session::default()), Arc::new(PrefixClassifier));
        let err = handler.execute_query(input("")).await.unwrap_err();
        assert!(matches!(err, DbError::NotConnected));
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let handler = connected_handler().await;
        for query in ["", "   ", "\n\t"] {
            let err = handler.execute_query(input(query)).await.unwrap_err();
            assert_eq!(err.to_string(), "Query cannot be empty");
        }
    }

    #[tokio::test]
    async fn test_read_path_payload() {
        let handler = connected_handler().await;
        let outcome = handler
            .execute_query(input("  select 1 AS a, NULL AS b  "))
            .await
            .unwrap();

        let data = outcome.data.unwrap();
        assert_eq!(data["rowCount"], 1);
        assert_eq!(data["columns"], serde_json::json!(["a", "b"]));
        assert!(data["rows"][0]["b"].is_null());
        assert!(outcome.text.contains("NULL"));
    }

    #[tokio::test]
    async fn test_cte_runs_on_mutate_path() {
        let handler = connected_handler().await;
        let outcome = handler
            .execute_query(input("WITH cte AS (SELECT 1) SELECT * FROM cte"))
            .await
            .unwrap();

        let data = outcome.data.unwrap();
        assert!(data.get("rowsAffected").is_some());
        assert!(data.get("rowCount").is_none());
    }
}
