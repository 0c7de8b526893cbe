//! Query execution engine.
//!
//! Two execution paths exist:
//! - `execute_query` runs a statement expected to return rows and collects
//!   them into a [`TabularResult`].
//! - `execute_write` runs a statement for its effect and reports the number
//!   of affected rows plus the generated id, if any.
//!
//! Statements are sent as plain text with no bound arguments, so anything
//! the server accepts (including statements that cannot be prepared) runs.
//!
//! # Architecture
//!
//! Database-specific implementations live in the `mysql` and `sqlite`
//! submodules. Row streams from both are drained by [`collect_rows`], which
//! also backs schema introspection.

use crate::db::pool::DbPool;
use crate::db::types::DecodeRow;
use crate::error::{DbError, DbResult};
use crate::models::{ScalarValue, TabularResult, WriteSummary};
use futures_util::{Stream, StreamExt};
use std::time::Instant;
use tracing::debug;

const EXECUTE_OPERATION: &str = "Failed to execute query";

/// Query executor that handles database query execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a row-returning statement and collect every row.
    pub async fn execute_query(&self, pool: &DbPool, sql: &str) -> DbResult<TabularResult> {
        let start = Instant::now();
        debug!(sql = %sql, db_type = %pool.db_type(), "Executing query");

        let result = match pool {
            DbPool::MySql(p) => mysql::fetch_table(p, sql).await?,
            DbPool::SQLite(p) => sqlite::fetch_table(p, sql).await?,
        };

        debug!(
            row_count = result.row_count(),
            columns = result.columns.len(),
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Query complete"
        );
        Ok(result)
    }

    /// Execute a statement for its effect.
    pub async fn execute_write(&self, pool: &DbPool, sql: &str) -> DbResult<WriteSummary> {
        let start = Instant::now();
        debug!(sql = %sql, db_type = %pool.db_type(), "Executing write operation");

        let summary = match pool {
            DbPool::MySql(p) => mysql::execute_write(p, sql).await?,
            DbPool::SQLite(p) => sqlite::execute_write(p, sql).await?,
        };

        debug!(
            rows_affected = summary.rows_affected,
            last_insert_id = ?summary.last_insert_id,
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Write complete"
        );
        Ok(summary)
    }
}

// =============================================================================
// Common Helper Functions
// =============================================================================

/// Drain a row stream, mapping each row with `map`.
///
/// A driver error before the first row means the statement itself failed
/// and is reported under `operation`. An error after rows were read is a
/// row iteration failure. A mapping failure is a scan failure on `target`.
pub(crate) async fn collect_rows<R, T, S, F>(
    mut stream: S,
    operation: &str,
    target: &str,
    mut map: F,
) -> DbResult<Vec<T>>
where
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
    F: FnMut(&R) -> Result<T, sqlx::Error>,
{
    let mut out = Vec::new();
    while let Some(next) = stream.next().await {
        let row = match next {
            Ok(row) => row,
            Err(e) if out.is_empty() => return Err(DbError::query(operation, e)),
            Err(e) => return Err(DbError::row_iteration(e)),
        };
        out.push(map(&row).map_err(|e| DbError::scan(target, e))?);
    }
    Ok(out)
}

/// Collect a row stream into a table, taking column names from the first row.
async fn collect_table<R, S>(stream: S) -> DbResult<(Option<Vec<String>>, Vec<Vec<ScalarValue>>)>
where
    R: DecodeRow,
    S: Stream<Item = Result<R, sqlx::Error>> + Unpin,
{
    let mut columns = None;
    let rows = collect_rows(stream, EXECUTE_OPERATION, "row", |row: &R| {
        if columns.is_none() {
            columns = Some(row.column_names());
        }
        row.decode_values()
    })
    .await?;
    Ok((columns, rows))
}

/// Column names of a statement that produced no rows.
///
/// Statements the server refuses to prepare report no columns.
fn described_columns<'q, S: sqlx::Statement<'q>>(
    prepared: Result<S, sqlx::Error>,
) -> Vec<String> {
    use sqlx::Column;
    match prepared {
        Ok(statement) => statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect(),
        Err(e) => {
            debug!(error = %e, "Could not describe statement columns");
            Vec::new()
        }
    }
}

/// Convert a driver-reported insert id, treating 0 as "no id".
fn generated_id(id: u64) -> Option<i64> {
    if id == 0 {
        None
    } else {
        i64::try_from(id).ok()
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod mysql {
    use super::*;
    use sqlx::{Executor, MySqlPool};

    pub async fn fetch_table(pool: &MySqlPool, sql: &str) -> DbResult<TabularResult> {
        let (columns, rows) = collect_table(pool.fetch(sql)).await?;
        let columns = match columns {
            Some(columns) => columns,
            None => described_columns(pool.prepare(sql).await),
        };
        Ok(TabularResult::new(columns, rows))
    }

    pub async fn execute_write(pool: &MySqlPool, sql: &str) -> DbResult<WriteSummary> {
        let result = pool
            .execute(sql)
            .await
            .map_err(|e| DbError::query(EXECUTE_OPERATION, e))?;

        Ok(WriteSummary {
            rows_affected: result.rows_affected(),
            last_insert_id: generated_id(result.last_insert_id()),
        })
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Executor, SqlitePool};

    pub async fn fetch_table(pool: &SqlitePool, sql: &str) -> DbResult<TabularResult> {
        let (columns, rows) = collect_table(pool.fetch(sql)).await?;
        let columns = match columns {
            Some(columns) => columns,
            None => described_columns(pool.prepare(sql).await),
        };
        Ok(TabularResult::new(columns, rows))
    }

    /// SQLite keeps the last generated rowid per connection and never resets
    /// it, so an id is reported only when the statement changed it.
    pub async fn execute_write(pool: &SqlitePool, sql: &str) -> DbResult<WriteSummary> {
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| DbError::query(EXECUTE_OPERATION, e))?;

        let before: i64 = sqlx::query_scalar("SELECT last_insert_rowid()")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| DbError::query(EXECUTE_OPERATION, e))?;

        let result = (&mut *conn)
            .execute(sql)
            .await
            .map_err(|e| DbError::query(EXECUTE_OPERATION, e))?;

        let after = result.last_insert_rowid();
        Ok(WriteSummary {
            rows_affected: result.rows_affected(),
            last_insert_id: (after != before && after != 0).then_some(after),
        })
    }
}
