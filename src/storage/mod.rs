//! Storage Engine Module
//!
//! The process-wide key-value map shared by every client connection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//!          ▲                ▲                 ▲
//!          │ Arc            │ Arc             │ Arc
//!     connection 1     connection 2      connection N
//! ```
//!
//! ## Example
//!
//! ```
//! use redis_lite::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StorageEngine::new());
//!
//! engine.set("foo", "bar baz");
//! assert_eq!(engine.get("foo"), Some("bar baz".to_string()));
//! ```

pub mod engine;

pub use engine::{StorageEngine, StorageStats};
