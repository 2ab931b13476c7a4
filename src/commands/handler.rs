//! Command Handler Module
//!
//! Validates the arity of a parsed request, runs it against the storage
//! engine, and produces the reply line.
//!
//! ## Supported Commands
//!
//! | Command            | Arity (tokens) | Reply                                 |
//! |--------------------|----------------|---------------------------------------|
//! | `PING`             | any            | `+PONG`                               |
//! | `ECHO message...`  | >= 2           | `+<message>`                          |
//! | `SET key value...` | >= 3           | `+OK`                                 |
//! | `GET key`          | exactly 2      | `+<value>` or `+(nil)`                |
//! | `QUIT`             | any            | `+OK Bye`, then the session closes    |
//!
//! Anything else is answered with `-ERR unknown command '<name>'`.
//! None of these errors ends the session.

use crate::protocol::{Reply, Request};
use crate::storage::StorageEngine;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Protocol usage errors. Their `Display` text is the error reply payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// ECHO without a message
    #[error("ERR wrong number of arguments")]
    MissingArguments,

    /// Wrong token count for the named command
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),

    /// First token is not a known command
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::error(err.to_string())
    }
}

/// What the connection should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send the reply and keep reading
    Reply(Reply),
    /// Send the reply, then close the session
    Close(Reply),
}

impl Outcome {
    pub fn reply(&self) -> &Reply {
        match self {
            Outcome::Reply(reply) | Outcome::Close(reply) => reply,
        }
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Outcome::Close(_))
    }
}

/// Dispatches requests to their command implementations.
///
/// Cheap to clone; every connection gets its own handle on the shared engine.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// The engine this handler operates on.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Executes one request.
    pub fn execute(&self, request: &Request) -> Outcome {
        let cmd = request.command();
        trace!(command = %cmd, args = request.args.len(), "Executing command");

        if cmd == "QUIT" {
            return Outcome::Close(Reply::bye());
        }

        let result = match cmd.as_str() {
            "PING" => Ok(Reply::pong()),
            "ECHO" => self.cmd_echo(request),
            "SET" => self.cmd_set(request),
            "GET" => self.cmd_get(request),
            _ => Err(CommandError::UnknownCommand(request.name.clone())),
        };

        Outcome::Reply(result.unwrap_or_else(Reply::from))
    }

    fn cmd_echo(&self, request: &Request) -> Result<Reply, CommandError> {
        if request.token_count() < 2 {
            return Err(CommandError::MissingArguments);
        }
        Ok(Reply::status(request.joined_args(0)))
    }

    fn cmd_set(&self, request: &Request) -> Result<Reply, CommandError> {
        if request.token_count() < 3 {
            return Err(CommandError::WrongArity("set"));
        }
        self.storage.set(request.args[0].as_str(), request.joined_args(1));
        Ok(Reply::ok())
    }

    fn cmd_get(&self, request: &Request) -> Result<Reply, CommandError> {
        if request.token_count() != 2 {
            return Err(CommandError::WrongArity("get"));
        }
        Ok(match self.storage.get(&request.args[0]) {
            Some(value) => Reply::status(value),
            None => Reply::nil(),
        })
    }
}
