//! Redis-Lite - A Minimal In-Memory Key-Value Server
//!
//! This is the main entry point for the server.
//! It parses options, sets up logging, binds the TCP listener and hands it
//! to the accept loop.

use anyhow::Context;
use clap::Parser;
use redis_lite::connection::ConnectionStats;
use redis_lite::storage::StorageEngine;
use redis_lite::{server, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &Config) {
    println!(
        r#"
Redis-Lite v{} - Minimal In-Memory Key-Value Server
──────────────────────────────────────────────────────────────
Redis-Lite listening on port {}...
Commands: PING, ECHO, SET, GET, QUIT

Use Ctrl+C to shutdown.
"#,
        redis_lite::VERSION,
        config.port
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Shared across all connections
    let storage = Arc::new(StorageEngine::new());
    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    print_banner(&config);
    info!(
        address = %config.bind_address(),
        shards = storage.shard_count(),
        "Listening"
    );

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server::run(listener, Arc::clone(&storage), stats, shutdown).await;

    info!(keys = storage.len(), "Server shutdown complete");
    Ok(())
}
