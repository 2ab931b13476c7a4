//! Line Protocol Implementation
//!
//! Requests are newline-terminated lines of whitespace-separated tokens;
//! replies are single `+`/`-` status lines terminated by CRLF.
//!
//! ## Modules
//!
//! - `types`: `Request` tokens and the `Reply` line encoding
//! - `parser`: Line framing over the connection's read buffer
//!
//! ## Example
//!
//! ```
//! use redis_lite::protocol::{LineParser, Reply};
//! use bytes::BytesMut;
//!
//! let mut buffer = BytesMut::from(&b"ECHO hello world\r\n"[..]);
//! let request = LineParser::new().parse(&mut buffer).unwrap().unwrap();
//!
//! let reply = Reply::status(request.joined_args(0));
//! assert_eq!(reply.serialize(), b"+hello world\r\n");
//! ```

pub mod parser;
pub mod types;

pub use parser::{LineParser, ParseError, ParseResult, MAX_LINE_LENGTH};
pub use types::{Reply, Request};
