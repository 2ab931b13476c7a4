//! Connection Handler Module
//!
//! This module manages individual client connections.
//! Each client connection is handled by its own async task; the only state
//! shared between tasks is the storage engine and the statistics counters.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                    (server.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read bytes  │───>│ Split line  │───>│ Execute cmd │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      ┌─────────────┐        │
//! │                                      │ Send reply  │        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use redis_lite::connection::{handle_connection, ConnectionStats};
//! use redis_lite::commands::CommandHandler;
//! use redis_lite::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageEngine::new());
//! let stats = Arc::new(ConnectionStats::new());
//! let handler = CommandHandler::new(storage);
//!
//! // For each accepted connection...
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, handler, stats));
//! ```

pub mod handler;

pub use handler::{
    handle_connection, CloseReason, ConnectionError, ConnectionHandler, ConnectionStats,
};
