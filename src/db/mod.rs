//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - DSN parsing
//! - Connection pool and session management
//! - Query execution
//! - Schema introspection
//! - Row decoding

pub mod dsn;
pub mod executor;
pub mod pool;
pub mod schema;
pub mod session;
pub mod types;

pub use dsn::ParsedDsn;
pub use executor::QueryExecutor;
pub use pool::DbPool;
pub use schema::SchemaInspector;
pub use session::Session;
