//! MySQL MCP Server Library
//!
//! This library exposes a MySQL database to AI assistants as MCP (Model
//! Context Protocol) tools: connect, list databases, list tables, describe a
//! table and execute a query. It also contains the self-updater used by the
//! `--update` mode of the binary.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;
pub mod update;

pub use config::Config;
pub use error::{DbError, UpdateError};
pub use mcp::MySqlService;
