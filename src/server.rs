//! TCP accept loop.
//!
//! Every accepted socket gets its own task running a
//! [`ConnectionHandler`](crate::connection::ConnectionHandler). There is no
//! admission limit and no idle timeout; sessions end on their own.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::StorageEngine;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Accepts connections until `shutdown` completes.
///
/// Accept errors are logged and the loop keeps going. Sessions already
/// running are left to finish on their own.
pub async fn run(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::select! {
        _ = accept_loop(listener, storage, stats) => {}
        _ = shutdown => {
            info!("Shutdown signal received, stopping server...");
        }
    }
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
