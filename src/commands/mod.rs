//! Command Handler Module
//!
//! Receives tokenized request lines, executes them against the storage
//! engine, and returns the reply line.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  LineParser     │  (protocol module)
//! └────────┬────────┘
//!          │ Request
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`, `ECHO`, `SET`, `GET`, `QUIT`

pub mod handler;

pub use handler::{CommandError, CommandHandler, Outcome};
