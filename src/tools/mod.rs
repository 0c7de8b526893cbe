//! MCP tool implementations.
//!
//! This module contains all database tool handlers:
//! - `connection`: Open and verify a database connection
//! - `schema`: List databases, list tables, describe a table
//! - `query`: Execute an arbitrary SQL statement
//! - `classifier`: Read/mutate routing for `query`
//! - `format`: Display text and structured payload projection

pub mod classifier;
pub mod connection;
pub mod format;
pub mod query;
pub mod schema;

pub use classifier::{PrefixClassifier, QueryClassifier, StatementKind};
pub use connection::{ConnectInput, ConnectionToolHandler};
pub use query::{ExecuteQueryInput, QueryToolHandler};
pub use schema::{DescribeTableInput, ListTablesInput, SchemaToolHandler};
