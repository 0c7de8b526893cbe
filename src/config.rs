//! Configuration handling for the MySQL MCP server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPDATE_URL: &str =
    "https://api.github.com/repos/josiah-hester/mysql-mcp/releases/latest";

/// Commit the binary was built from, injected at build time.
pub const BUILD_COMMIT: &str = match option_env!("MYSQL_MCP_COMMIT") {
    Some(commit) => commit,
    None => "dev",
};

/// Build date, injected at build time.
pub const BUILD_DATE: &str = match option_env!("MYSQL_MCP_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// What the process does after parsing its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print version information and exit.
    Version,
    /// Replace the running binary with the latest release and exit.
    Update,
    /// Serve tool calls over stdio.
    Serve,
}

/// Pool settings applied to every connection the session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Ignored for SQLite, which always uses a single connection.
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

/// MySQL MCP Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "mysql-mcp")]
#[command(about = "MCP server exposing MySQL operations as tools")]
#[command(disable_version_flag = true)]
pub struct Config {
    /// MySQL DSN to connect to at startup (e.g., user:password@tcp(localhost:3306)/database).
    /// The server exits if the connection fails.
    #[arg(long, env = "MYSQL_DSN", hide_env_values = true)]
    pub dsn: Option<String>,

    /// Print version information and exit
    #[arg(long, conflicts_with = "update")]
    pub version: bool,

    /// Update to the latest released version and exit
    #[arg(long)]
    pub update: bool,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS", default_value_t = false)]
    pub json_logs: bool,

    /// Maximum pooled connections to a MySQL server
    #[arg(
        long,
        env = "MYSQL_MCP_MAX_CONNECTIONS",
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[arg(
        long,
        env = "MYSQL_MCP_ACQUIRE_TIMEOUT_SECS",
        default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS
    )]
    pub acquire_timeout_secs: u64,

    /// Release feed queried by --update
    #[arg(long, env = "MYSQL_MCP_UPDATE_URL", default_value = DEFAULT_UPDATE_URL)]
    pub update_url: String,
}

impl Config {
    pub fn run_mode(&self) -> RunMode {
        if self.version {
            RunMode::Version
        } else if self.update {
            RunMode::Update
        } else {
            RunMode::Serve
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }

    /// Text printed by `--version`.
    pub fn version_text() -> String {
        format!(
            "mysql-mcp-server version {}\nCommit: {}\nBuilt: {}",
            env!("CARGO_PKG_VERSION"),
            BUILD_COMMIT,
            BUILD_DATE
        )
    }
}
