//! # Redis-Lite - A Minimal In-Memory Key-Value Server
//!
//! Redis-Lite serves a single shared string map over a line-based TCP text
//! protocol. Each client sends newline-terminated commands and receives one
//! `+`/`-` status line per command.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             Redis-Lite                                  │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   Line      │    │              StorageEngine                   │   │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │   │
//! │  │             │    │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...N    │ │   │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │RwLock  │ │shards  │ │   │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │   │
//! │                     └──────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use redis_lite::{server, ConnectionStats, StorageEngine};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Arc::new(StorageEngine::new());
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("0.0.0.0:6379").await?;
//!
//!     server::run(listener, storage, stats, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `ECHO message...`
//! - `SET key value...`
//! - `GET key`
//! - `QUIT`
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line framing, tokenizing and reply encoding
//! - [`storage`]: Thread-safe shared map
//! - [`commands`]: Arity checks and dispatch
//! - [`connection`]: Per-client session loop
//! - [`server`]: Accept loop
//! - [`config`]: Command-line options

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

pub use commands::{CommandError, CommandHandler, Outcome};
pub use config::Config;
pub use connection::{handle_connection, CloseReason, ConnectionError, ConnectionStats};
pub use protocol::{LineParser, ParseError, Reply, Request};
pub use storage::{StorageEngine, StorageStats};

/// The default port the server listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host the server binds to (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Version of Redis-Lite
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
