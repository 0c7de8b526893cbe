//! Connection tool.
//!
//! This module implements the `connect` MCP tool.

use crate::db::Session;
use crate::error::DbResult;
use crate::models::ToolOutcome;
use crate::tools::format::format_connected;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the connect tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConnectInput {
    /// MySQL DSN (e.g., user:password@tcp(localhost:3306)/database)
    pub dsn: String,
}

/// Handler for the connect tool.
pub struct ConnectionToolHandler {
    session: Arc<Session>,
}

impl ConnectionToolHandler {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Open and verify a connection, replacing the stored one on success.
    pub async fn connect(&self, input: ConnectInput) -> DbResult<ToolOutcome> {
        let info = self.session.connect(&input.dsn).await?;

        info!(
            tool = "connect",
            db_type = %info.db_type,
            dsn = %info.masked_dsn,
            "Connect tool completed"
        );

        Ok(ToolOutcome::success(format_connected(info.db_type)))
    }
}
