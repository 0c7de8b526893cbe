//! Connection pool wrapper.
//!
//! The session stores one pool, using the database-specific pool types
//! (MySqlPool, SqlitePool) to keep full type support.

use crate::config::PoolSettings;
use crate::db::dsn::{ConnectTarget, ParsedDsn};
use crate::models::DatabaseType;
use sqlx::{
    ConnectOptions, Connection, MySqlPool, SqlitePool, mysql::MySqlPoolOptions,
    sqlite::SqlitePoolOptions,
};

/// Database-specific connection pool.
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    SQLite(SqlitePool),
}

impl DbPool {
    /// Build a pool without opening any connection.
    ///
    /// SQLite gets a single connection that never idles out, so in-memory
    /// databases survive between calls.
    pub fn connect_lazy(dsn: &ParsedDsn, settings: &PoolSettings) -> Self {
        match &dsn.target {
            ConnectTarget::MySql(options) => DbPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(settings.acquire_timeout)
                    .connect_lazy_with(options.clone()),
            ),
            ConnectTarget::Sqlite(options) => DbPool::SQLite(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .acquire_timeout(settings.acquire_timeout)
                    .connect_lazy_with(options.clone()),
            ),
        }
    }

    /// Open one connection outside any pool, ping it and close it.
    ///
    /// Pool acquisition retries refused connections until the acquire
    /// timeout, so the first driver failure is only visible here.
    pub async fn verify(dsn: &ParsedDsn) -> Result<(), sqlx::Error> {
        match &dsn.target {
            ConnectTarget::MySql(options) => ping_once(options.connect().await?).await,
            ConnectTarget::Sqlite(options) => ping_once(options.connect().await?).await,
        }
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        match self {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::SQLite(pool) => pool.close().await,
        }
    }

    /// Get the database type for this pool.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbPool::MySql(_) => DatabaseType::MySQL,
            DbPool::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

async fn ping_once<C: Connection>(mut conn: C) -> Result<(), sqlx::Error> {
    conn.ping().await?;
    conn.close().await
}
