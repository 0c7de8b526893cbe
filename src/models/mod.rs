//! Data models for the MySQL MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod outcome;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use connection::{ConnectionInfo, DatabaseType};
pub use outcome::ToolOutcome;
pub use schema::{ColumnInfo, DatabaseInfo, TableInfo};
pub use value::{ScalarValue, TabularResult, WriteSummary};
