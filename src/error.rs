//! Error types for the MySQL MCP server.
//!
//! Two classes of error exist:
//! - [`DbError`] is call-scoped. Every variant is turned into an error
//!   outcome for the tool call that raised it; its `Display` text is what the
//!   caller sees.
//! - [`UpdateError`] is process-fatal. The self-updater propagates it to
//!   `main`, which logs it and exits non-zero.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Not connected to database. Use connect tool first.")]
    NotConnected,

    #[error("Failed to open database: {message}")]
    Open { message: String },

    #[error("Failed to ping database: {message}")]
    Ping { message: String },

    #[error("{operation}: {message}")]
    Query {
        operation: String,
        message: String,
        /// e.g., "42S02" for unknown table
        sql_state: Option<String>,
    },

    #[error("Failed to scan {target}: {message}")]
    Scan { target: String, message: String },

    #[error("Row iteration error: {message}")]
    RowIteration { message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Request cancelled: {tool}")]
    Cancelled { tool: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create an open error (DSN could not be turned into a connection).
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create a ping error from the driver failure.
    pub fn ping(err: sqlx::Error) -> Self {
        Self::Ping {
            message: driver_message(&err),
        }
    }

    /// Create a query error, keeping the SQLSTATE reported by the driver.
    pub fn query(operation: impl Into<String>, err: sqlx::Error) -> Self {
        let sql_state = match &err {
            sqlx::Error::Database(db_err) => db_err.code().map(|c| c.to_string()),
            _ => None,
        };
        Self::Query {
            operation: operation.into(),
            message: driver_message(&err),
            sql_state,
        }
    }

    /// Create a scan error for a row that could not be decoded.
    pub fn scan(target: impl Into<String>, err: sqlx::Error) -> Self {
        Self::Scan {
            target: target.into(),
            message: driver_message(&err),
        }
    }

    /// Create a row iteration error (failure after rows were already read).
    pub fn row_iteration(err: sqlx::Error) -> Self {
        Self::RowIteration {
            message: driver_message(&err),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a cancelled error for the named tool.
    pub fn cancelled(tool: impl Into<String>) -> Self {
        Self::Cancelled { tool: tool.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// SQLSTATE reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Query { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Extract the human-readable part of a driver error.
///
/// Server-side errors report only the server message; everything else uses
/// the driver's own description.
fn driver_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        sqlx::Error::Configuration(msg) => msg.to_string(),
        sqlx::Error::Io(io_err) => format!("I/O error: {}", io_err),
        sqlx::Error::Tls(tls_err) => format!("TLS error: {}", tls_err),
        sqlx::Error::Protocol(msg) => format!("Protocol error: {}", msg),
        sqlx::Error::PoolTimedOut => "timed out acquiring a connection from the pool".to_string(),
        sqlx::Error::PoolClosed => "connection pool is closed".to_string(),
        sqlx::Error::ColumnDecode { index, source } => {
            format!("column {}: {}", index, source)
        }
        other => other.to_string(),
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("failed to check for updates: {message}")]
    Check { message: String },

    #[error("failed to parse release info: {message}")]
    ParseRelease { message: String },

    #[error("no compatible release found for {os} {arch}")]
    NoCompatibleAsset { os: String, arch: String },

    #[error("failed to download update: {message}")]
    Download { message: String },

    #[error("failed to get current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("failed to extract update: {message}")]
    Extract { message: String },

    #[error("binary not found in archive")]
    BinaryNotFound,

    #[error("failed to write new binary: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to make new binary executable: {0}")]
    Permissions(#[source] std::io::Error),

    #[error("failed to replace binary: {0}")]
    Replace(#[source] std::io::Error),
}

impl UpdateError {
    pub fn check(message: impl Into<String>) -> Self {
        Self::Check {
            message: message.into(),
        }
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    pub fn extract(message: impl Into<String>) -> Self {
        Self::Extract {
            message: message.into(),
        }
    }
}

/// Result type alias for self-update operations.
pub type UpdateResult<T> = Result<T, UpdateError>;
