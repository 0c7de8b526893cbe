//! MySQL MCP Server - Main entry point.
//!
//! Serves the database tools over stdio, or runs one of the one-shot modes
//! (`--version`, `--update`).

use clap::Parser;
use mysql_mcp::config::{Config, RunMode};
use mysql_mcp::db::Session;
use mysql_mcp::transport::{StdioTransport, Transport};
use mysql_mcp::update::{GitHubReleaseClient, UpdateOutcome, Updater};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the MCP message stream.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

async fn run_update(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = GitHubReleaseClient::new(config.update_url.clone())?;
    let updater = Updater::for_current_exe(client)?;

    match updater.run().await? {
        UpdateOutcome::UpToDate { version } => {
            println!("Already up to date (version {})", version);
        }
        UpdateOutcome::Updated { installed, .. } => {
            println!("Successfully updated to version {}", installed);
            println!("Please restart the application to use the new version.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    match config.run_mode() {
        RunMode::Version => {
            println!("{}", Config::version_text());
            return Ok(());
        }
        RunMode::Update => {
            init_tracing(&config);
            if let Err(e) = run_update(&config).await {
                error!(error = %e, "Update failed");
                return Err(e);
            }
            return Ok(());
        }
        RunMode::Serve => init_tracing(&config),
    }

    info!("Starting MySQL MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let session = Arc::new(Session::new(config.pool_settings()));

    // Connect at startup when a DSN was supplied
    if let Some(dsn) = &config.dsn {
        if let Err(e) = session.connect(dsn).await {
            error!(error = %e, "Failed to connect at startup");
            return Err(e.into());
        }
    }

    let transport = StdioTransport::new(session);
    info!(transport = transport.name(), "Serving tools");

    // A transport failure ends the process normally after logging.
    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
    }

    info!("Server shutdown complete");
    Ok(())
}
