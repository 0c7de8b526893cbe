//! Session holding the active database connection.
//!
//! The session owns at most one pool. `connect` replaces it only after a
//! direct connection to the new target has answered a ping; every other
//! operation clones the current pool under a short read lock and releases
//! the lock before touching the database.

use crate::config::PoolSettings;
use crate::db::dsn::ParsedDsn;
use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::ConnectionInfo;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Session {
    current: RwLock<Option<DbPool>>,
    settings: PoolSettings,
}

impl Session {
    pub fn new(settings: PoolSettings) -> Self {
        Self {
            current: RwLock::new(None),
            settings,
        }
    }

    /// Verify `dsn` on a direct connection, then store a pool for it.
    ///
    /// On failure the previously stored connection is left untouched.
    pub async fn connect(&self, dsn: &str) -> DbResult<ConnectionInfo> {
        let parsed = ParsedDsn::parse(dsn)?;
        let info = ConnectionInfo {
            db_type: parsed.db_type(),
            masked_dsn: parsed.masked().to_string(),
            database: parsed.database.clone(),
        };

        debug!(dsn = %info.masked_dsn, db_type = %info.db_type, "Opening database");

        DbPool::verify(&parsed).await.map_err(DbError::ping)?;
        let pool = DbPool::connect_lazy(&parsed, &self.settings);

        let previous = self.current.write().await.replace(pool);
        if previous.is_some() {
            debug!("Replaced previous connection");
        }

        info!(
            dsn = %info.masked_dsn,
            db_type = %info.db_type,
            database = ?info.database,
            "Connected successfully"
        );

        Ok(info)
    }

    /// Get the current pool, or `NotConnected` when none was stored.
    pub async fn pool(&self) -> DbResult<DbPool> {
        self.current
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(DbError::NotConnected)
    }

    pub async fn is_connected(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Close the stored pool, if any.
    pub async fn close(&self) {
        let pool = self.current.write().await.take();
        if let Some(pool) = pool {
            info!(db_type = %pool.db_type(), "Closing database connection");
            pool.close().await;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PoolSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_new_session_is_not_connected() {
        let session = Session::default();
        assert!(!session.is_connected().await);
        assert!(matches!(
            session.pool().await.unwrap_err(),
            DbError::NotConnected
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_dsn() {
        let session = Session::default();
        let err = session.connect("not a dsn").await.unwrap_err();
        assert!(matches!(err, DbError::Open { .. }));
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_refused_connection_fails_fast() {
        let session = Session::default();
        let started = Instant::now();

        let err = session.connect("root@tcp(127.0.0.1:1)/").await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, DbError::Ping { .. }));
        assert!(
            err.to_string().starts_with("Failed to ping database: I/O error: "),
            "unexpected error: {}",
            err
        );
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_in_memory_sqlite() {
        let session = Session::default();
        let info = session.connect("sqlite::memory:").await.unwrap();
        assert_eq!(info.db_type, crate::models::DatabaseType::SQLite);
        assert!(session.is_connected().await);

        session.close().await;
        assert!(!session.is_connected().await);
    }
}
