//! Protocol Data Types
//!
//! Requests are single text lines split into whitespace-separated tokens.
//! Replies are single status lines:
//!
//! - `+` Success
//! - `-` Error
//!
//! Every reply is terminated with CRLF (`\r\n`), whatever terminator the
//! request line used. There is no length-prefixed encoding.
//!
//! ## Examples
//!
//! Request: `SET foo bar baz\n`
//! Success: `+OK\r\n`
//! Error: `-ERR unknown command 'FOO'\r\n`

use std::fmt;

/// The CRLF terminator appended to every reply
pub const CRLF: &[u8] = b"\r\n";

/// Reply type prefixes
pub mod prefix {
    pub const STATUS: u8 = b'+';
    pub const ERROR: u8 = b'-';
}

/// Payload returned by GET for a key that was never set.
pub const NIL: &str = "(nil)";

/// One parsed request line.
///
/// `name` keeps the casing the client sent; match on [`Request::command`]
/// instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The first token of the line
    pub name: String,
    /// Every token after the first
    pub args: Vec<String>,
}

impl Request {
    /// Tokenizes a line on whitespace.
    ///
    /// Returns `None` for a line with no tokens. No quoting or escaping is
    /// recognised.
    ///
    /// # Example
    /// ```
    /// use redis_lite::protocol::Request;
    /// let req = Request::from_line("set foo  bar\r").unwrap();
    /// assert_eq!(req.command(), "SET");
    /// assert_eq!(req.args, vec!["foo", "bar"]);
    /// ```
    pub fn from_line(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let name = tokens.next()?;
        Some(Self {
            name,
            args: tokens.collect(),
        })
    }

    /// The command name normalized to upper case, for comparison only.
    pub fn command(&self) -> String {
        self.name.to_uppercase()
    }

    /// Total token count, command name included.
    pub fn token_count(&self) -> usize {
        self.args.len() + 1
    }

    /// Joins the arguments from `start` onward with single spaces.
    pub fn joined_args(&self, start: usize) -> String {
        self.args.get(start..).unwrap_or_default().join(" ")
    }
}

/// A single-line reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success line.
    /// Format: `+<text>\r\n`
    Status(String),

    /// Error line.
    /// Format: `-<message>\r\n`
    Error(String),
}

impl Reply {
    /// Creates a success reply.
    ///
    /// # Example
    /// ```
    /// use redis_lite::protocol::Reply;
    /// assert_eq!(Reply::status("hello").serialize(), b"+hello\r\n");
    /// ```
    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    /// Creates an error reply.
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    pub fn ok() -> Self {
        Reply::status("OK")
    }

    pub fn pong() -> Self {
        Reply::status("PONG")
    }

    /// Reply for GET on a missing key.
    pub fn nil() -> Self {
        Reply::status(NIL)
    }

    /// Final reply sent before a session closes on QUIT.
    pub fn bye() -> Self {
        Reply::status("OK Bye")
    }

    /// Serializes the reply to its wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        let (marker, text) = match self {
            Reply::Status(s) => (prefix::STATUS, s),
            Reply::Error(s) => (prefix::ERROR, s),
        };
        buf.push(marker);
        buf.extend_from_slice(text.as_bytes());
        buf.extend_from_slice(CRLF);
    }

    /// Returns true if this is an error reply.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// The reply text without its prefix or terminator.
    pub fn text(&self) -> &str {
        match self {
            Reply::Status(s) | Reply::Error(s) => s,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) => write!(f, "\"{}\"", s),
            Reply::Error(s) => write!(f, "(error) {}", s),
        }
    }
}
