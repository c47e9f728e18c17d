mod atom;
mod config;
mod error;
mod mowen;
mod paragraph;
mod requests;
mod response;
mod server;
mod tools;
mod upload;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use config::{Config, LoggingConfig};
use mowen::MowenClient;
use server::McpServer;
use std::sync::Arc;
use tokio::signal::unix::{signal, Signal, SignalKind};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration; a missing API key stops here
    let config = Config::load()?;

    init_logging(&config.logging);
    log::info!("Starting Mowen MCP server...");

    let client = Arc::new(MowenClient::new(&config.mowen)?);
    log::info!("Mowen client ready for {}", client.base_url());

    let server = McpServer::new(client, config.server.clone());
    log::info!(
        "Serving {} v{} on stdio",
        config.server.name,
        config.server.version
    );

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    tokio::select! {
        result = server.serve_stdio() => result?,
        name = shutdown_requested(&mut terminate) => log::info!("Received {}, shutting down", name),
    }

    log::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level. Output goes to stderr, which
/// keeps stdout free for protocol traffic.
fn init_logging(logging: &LoggingConfig) {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

/// Resolves on Ctrl+C or SIGTERM, naming the signal.
async fn shutdown_requested(terminate: &mut Signal) -> &'static str {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "Ctrl+C",
        _ = terminate.recv() => "SIGTERM",
    }
}
