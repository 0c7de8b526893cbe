//! Schema introspection module.
//!
//! This module provides the database, table and column listings behind the
//! introspection tools, for MySQL and SQLite.
//!
//! # Architecture
//!
//! SQL queries are organized in the `queries` submodule with constants for each
//! database type. Database-specific implementations are in their respective
//! submodules (mysql, sqlite), each providing the same interface. SQLite maps
//! "databases" onto its attached schemas.

use crate::db::executor::collect_rows;
use crate::db::pool::DbPool;
use crate::db::types::DecodeRow;
use crate::error::DbResult;
use crate::models::{ColumnInfo, DatabaseInfo, TableInfo};
use tracing::debug;

mod operation {
    pub const DATABASES: &str = "Failed to query databases";
    pub const TABLES: &str = "Failed to query tables";
    pub const COLUMNS: &str = "Failed to query table columns";
}

mod target {
    pub const DATABASE: &str = "database name";
    pub const TABLE: &str = "table info";
    pub const COLUMN: &str = "column info";
}

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List every database visible to the connection.
    pub async fn list_databases(pool: &DbPool) -> DbResult<Vec<DatabaseInfo>> {
        debug!(db_type = %pool.db_type(), "Listing databases");
        match pool {
            DbPool::MySql(p) => mysql::list_databases(p).await,
            DbPool::SQLite(p) => sqlite::list_databases(p).await,
        }
    }

    /// List the tables and views of `database`.
    ///
    /// An unknown database yields an empty list.
    pub async fn list_tables(pool: &DbPool, database: &str) -> DbResult<Vec<TableInfo>> {
        debug!(db_type = %pool.db_type(), database = %database, "Listing tables");
        match pool {
            DbPool::MySql(p) => mysql::list_tables(p, database).await,
            DbPool::SQLite(p) => sqlite::list_tables(p, database).await,
        }
    }

    /// Describe the columns of `database.table` in ordinal order.
    ///
    /// An unknown table yields an empty list.
    pub async fn describe_table(
        pool: &DbPool,
        database: &str,
        table: &str,
    ) -> DbResult<Vec<ColumnInfo>> {
        debug!(
            db_type = %pool.db_type(),
            database = %database,
            table = %table,
            "Describing table"
        );
        match pool {
            DbPool::MySql(p) => mysql::describe_table(p, database, table).await,
            DbPool::SQLite(p) => sqlite::describe_table(p, database, table).await,
        }
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    pub mod mysql {
        pub const LIST_DATABASES: &str = "SHOW DATABASES";

        pub const LIST_TABLES: &str = r#"
            SELECT
                CONVERT(TABLE_NAME USING utf8mb4) AS TABLE_NAME,
                CONVERT(TABLE_TYPE USING utf8mb4) AS TABLE_TYPE,
                CONVERT(TABLE_SCHEMA USING utf8mb4) AS TABLE_SCHEMA
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ?
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT
                CONVERT(COLUMN_NAME USING utf8mb4) AS COLUMN_NAME,
                CONVERT(DATA_TYPE USING utf8mb4) AS DATA_TYPE,
                CONVERT(IS_NULLABLE USING utf8mb4) AS IS_NULLABLE,
                CONVERT(COLUMN_DEFAULT USING utf8mb4) AS COLUMN_DEFAULT,
                CONVERT(EXTRA USING utf8mb4) AS EXTRA
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#;
    }

    pub mod sqlite {
        pub const LIST_DATABASES: &str = "SELECT name FROM pragma_database_list ORDER BY seq";

        pub const LIST_TABLES: &str = r#"
            SELECT
                name,
                CASE type WHEN 'view' THEN 'VIEW' ELSE 'BASE TABLE' END AS table_type,
                schema
            FROM pragma_table_list
            WHERE schema = ?1 AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
            ORDER BY name
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT
                name,
                type,
                CASE WHEN "notnull" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable,
                dflt_value,
                CASE WHEN pk > 0 THEN 'PRIMARY KEY' ELSE '' END AS extra
            FROM pragma_table_info(?2, ?1)
            ORDER BY cid
            "#;
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn database_from_row<R: DecodeRow>(row: &R) -> Result<DatabaseInfo, sqlx::Error> {
    Ok(DatabaseInfo { name: row.text(0)? })
}

fn table_from_row<R: DecodeRow>(row: &R) -> Result<TableInfo, sqlx::Error> {
    Ok(TableInfo {
        table_name: row.text(0)?,
        table_type: row.text(1)?,
        table_schema: row.text(2)?,
    })
}

fn column_from_row<R: DecodeRow>(row: &R) -> Result<ColumnInfo, sqlx::Error> {
    Ok(ColumnInfo {
        column_name: row.text(0)?,
        data_type: row.text(1)?,
        is_nullable: row.text(2)?,
        column_default: row.optional_text(3)?,
        extra: row.text(4)?,
    })
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod mysql {
    use super::*;
    use sqlx::{Executor, MySqlPool};
    use sqlx::mysql::MySqlRow;

    pub async fn list_databases(pool: &MySqlPool) -> DbResult<Vec<DatabaseInfo>> {
        collect_rows(
            pool.fetch(queries::mysql::LIST_DATABASES),
            operation::DATABASES,
            target::DATABASE,
            database_from_row::<MySqlRow>,
        )
        .await
    }

    pub async fn list_tables(pool: &MySqlPool, database: &str) -> DbResult<Vec<TableInfo>> {
        let stream = sqlx::query(queries::mysql::LIST_TABLES)
            .bind(database)
            .fetch(pool);
        collect_rows(stream, operation::TABLES, target::TABLE, table_from_row::<MySqlRow>).await
    }

    pub async fn describe_table(
        pool: &MySqlPool,
        database: &str,
        table: &str,
    ) -> DbResult<Vec<ColumnInfo>> {
        let stream = sqlx::query(queries::mysql::DESCRIBE_COLUMNS)
            .bind(database)
            .bind(table)
            .fetch(pool);
        collect_rows(stream, operation::COLUMNS, target::COLUMN, column_from_row::<MySqlRow>).await
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Executor, SqlitePool};
    use sqlx::sqlite::SqliteRow;

    pub async fn list_databases(pool: &SqlitePool) -> DbResult<Vec<DatabaseInfo>> {
        collect_rows(
            pool.fetch(queries::sqlite::LIST_DATABASES),
            operation::DATABASES,
            target::DATABASE,
            database_from_row::<SqliteRow>,
        )
        .await
    }

    pub async fn list_tables(pool: &SqlitePool, database: &str) -> DbResult<Vec<TableInfo>> {
        let stream = sqlx::query(queries::sqlite::LIST_TABLES)
            .bind(database)
            .fetch(pool);
        collect_rows(stream, operation::TABLES, target::TABLE, table_from_row::<SqliteRow>).await
    }

    pub async fn describe_table(
        pool: &SqlitePool,
        database: &str,
        table: &str,
    ) -> DbResult<Vec<ColumnInfo>> {
        let stream = sqlx::query(queries::sqlite::DESCRIBE_COLUMNS)
            .bind(database)
            .bind(table)
            .fetch(pool);
        collect_rows(stream, operation::COLUMNS, target::COLUMN, column_from_row::<SqliteRow>)
            .await
    }
}
