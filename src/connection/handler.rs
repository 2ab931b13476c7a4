//! Connection Handler Module
//!
//! This module handles individual client connections.
//! Each client gets its own handler task that runs in a loop,
//! reading request lines and sending replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  READING                     │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read bytes from socket  │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  DISPATCHING                 │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Split line, execute,    │ │
//!    │  │ send one reply line     │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. CLOSED: QUIT, client EOF, or read error
//! ```
//!
//! A malformed command never ends the session; it is answered with an
//! error line. A read error ends it without a final reply.

use crate::commands::{CommandHandler, Outcome};
use crate::protocol::{LineParser, ParseError, Reply, Request};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent QUIT
    Quit,
    /// The client closed its side of the connection
    ClientClosed,
}

/// Errors that end a session without a final reply.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Handles a single client connection.
///
/// Generic over the stream so sessions can be driven by a `TcpStream` or by
/// any other duplex byte stream.
pub struct ConnectionHandler<S> {
    /// The client stream, with buffered writes
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Bytes read but not yet framed into lines
    buffer: BytesMut,

    /// The command handler (shares the storage engine)
    command_handler: CommandHandler,

    parser: LineParser,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream for this connection
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            parser: LineParser::new(),
            stats,
        }
    }

    /// Replaces the line parser, e.g. to change the maximum line length.
    pub fn with_parser(mut self, parser: LineParser) -> Self {
        self.parser = parser;
        self
    }

    /// Runs the session until QUIT, client close, or an error.
    pub async fn run(mut self) -> Result<CloseReason, ConnectionError> {
        info!(client = %self.addr, "New connection");

        let result = self.main_loop().await;

        match &result {
            Ok(CloseReason::Quit) => info!(client = %self.addr, "Client sent QUIT"),
            Ok(CloseReason::ClientClosed) => {
                info!(client = %self.addr, "Connection closed by client")
            }
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                info!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The read-dispatch-reply loop.
    async fn main_loop(&mut self) -> Result<CloseReason, ConnectionError> {
        loop {
            while let Some(request) = self.parser.parse(&mut self.buffer)? {
                if self.dispatch(&request).await? {
                    return Ok(CloseReason::Quit);
                }
            }

            if !self.read_more_data().await? {
                // The peer is done sending; serve any unterminated last line.
                while let Some(request) = self.parser.finish(&mut self.buffer)? {
                    if self.dispatch(&request).await? {
                        return Ok(CloseReason::Quit);
                    }
                }
                return Ok(CloseReason::ClientClosed);
            }
        }
    }

    /// Executes one request and sends its reply.
    ///
    /// Returns `true` when the session must close.
    async fn dispatch(&mut self, request: &Request) -> Result<bool, ConnectionError> {
        let outcome = self.command_handler.execute(request);
        self.stats.command_processed();

        debug!(
            client = %self.addr,
            command = %request.name,
            reply = %outcome.reply(),
            "Command processed"
        );

        self.send_reply(outcome.reply()).await?;
        Ok(matches!(outcome, Outcome::Close(_)))
    }

    /// Reads more data from the stream into the buffer.
    ///
    /// Returns `false` once the client has closed its side.
    async fn read_more_data(&mut self) -> Result<bool, ConnectionError> {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return Ok(false);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(true)
    }

    /// Sends a reply line to the client.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent reply"
        );
        Ok(())
    }
}

/// Handles a client connection.
///
/// Creates a ConnectionHandler and runs it to completion. Errors have
/// already been logged by the handler and end only this session.
///
/// # Arguments
///
/// * `stream` - The client stream for this connection
/// * `addr` - The client's socket address
/// * `command_handler` - The command handler for executing commands
/// * `stats` - Shared connection statistics
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    let _ = handler.run().await;
}
