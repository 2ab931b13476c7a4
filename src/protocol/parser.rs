//! Line Framing Parser
//!
//! Pulls newline-terminated request lines out of a connection's read buffer.
//!
//! ## How the Parser Works
//!
//! The parser inspects a `BytesMut` buffer and returns either:
//! - `Ok(Some(request))` - A complete, non-blank line was consumed from the buffer
//! - `Ok(None)` - No complete line is buffered yet (blank lines are consumed silently)
//! - `Err(ParseError)` - The pending line exceeds the length limit
//!
//! Trailing whitespace, including a `\r` before the `\n`, is not significant.
//! Bytes that are not valid UTF-8 are replaced rather than rejected.

use crate::protocol::types::Request;
use bytes::BytesMut;
use thiserror::Error;

/// Errors that can occur while framing lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line grew past the maximum length without a newline
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum length of a single request line (64 KB).
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Splits a byte stream into request lines.
///
/// # Example
///
/// ```
/// use redis_lite::protocol::LineParser;
/// use bytes::BytesMut;
///
/// let parser = LineParser::new();
/// let mut buffer = BytesMut::from(&b"\r\nGET name\r\nPING"[..]);
///
/// let request = parser.parse(&mut buffer).unwrap().unwrap();
/// assert_eq!(request.command(), "GET");
///
/// // "PING" has no newline yet
/// assert!(parser.parse(&mut buffer).unwrap().is_none());
/// assert_eq!(&buffer[..], b"PING");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LineParser {
    max_line_length: usize,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self { max_line_length }
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Consumes lines from the front of `buf` until one yields a request.
    pub fn parse(&self, buf: &mut BytesMut) -> ParseResult<Option<Request>> {
        loop {
            let Some(newline) = buf.iter().position(|&b| b == b'\n') else {
                self.check_length(buf.len())?;
                return Ok(None);
            };
            self.check_length(newline)?;

            let line = buf.split_to(newline + 1);
            if let Some(request) = Request::from_line(&String::from_utf8_lossy(&line)) {
                return Ok(Some(request));
            }
        }
    }

    /// Drains whatever is left in `buf` once the peer has stopped sending.
    ///
    /// An unterminated final line still counts as a request.
    pub fn finish(&self, buf: &mut BytesMut) -> ParseResult<Option<Request>> {
        if let Some(request) = self.parse(buf)? {
            return Ok(Some(request));
        }
        let rest = buf.split();
        Ok(Request::from_line(&String::from_utf8_lossy(&rest)))
    }

    fn check_length(&self, size: usize) -> ParseResult<()> {
        if size > self.max_line_length {
            return Err(ParseError::LineTooLong {
                size,
                max: self.max_line_length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(data: &[u8]) -> BytesMut {
        BytesMut::from(data)
    }

    #[test]
    fn test_parse_lf_line() {
        let parser = LineParser::new();
        let mut buf = buffer(b"PING\n");

        let req = parser.parse(&mut buf).unwrap().unwrap();
        assert_eq!(req.name, "PING");
        assert!(req.args.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_crlf_line() {
        let parser = LineParser::new();
        let mut buf = buffer(b"ECHO hello world\r\n");

        let req = parser.parse(&mut buf).unwrap().unwrap();
        assert_eq!(req.args, vec!["hello", "world"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_incomplete() {
        let parser = LineParser::new();
        let mut buf = buffer(b"SET foo ba");

        assert!(parser.parse(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"SET foo ba");

        buf.extend_from_slice(b"r\n");
        let req = parser.parse(&mut buf).unwrap().unwrap();
        assert_eq!(req.args, vec!["foo", "bar"]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let parser = LineParser::new();
        let mut buf = buffer(b"\n\r\n   \t\r\nGET foo\n");

        let req = parser.parse(&mut buf).unwrap().unwrap();
        assert_eq!(req.command(), "GET");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_only_blank_lines() {
        let parser = LineParser::new();
        let mut buf = buffer(b"\r\n\n");

        assert!(parser.parse(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_pipelined() {
        let parser = LineParser::new();
        let mut buf = buffer(b"SET a 1\nGET a\nPING\n");

        let names: Vec<String> = std::iter::from_fn(|| parser.parse(&mut buf).unwrap())
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["SET", "GET", "PING"]);
    }

    #[test]
    fn test_parse_invalid_utf8_is_lossy() {
        let parser = LineParser::new();
        let mut buf = buffer(b"ECHO \xff\xfe\n");

        let req = parser.parse(&mut buf).unwrap().unwrap();
        assert_eq!(req.args.len(), 1);
        assert!(req.args[0].contains('\u{FFFD}'));
    }

    #[test]
    fn test_line_too_long_without_newline() {
        let parser = LineParser::with_max_line_length(8);
        let mut buf = buffer(b"ECHO 123456789");

        assert_eq!(
            parser.parse(&mut buf),
            Err(ParseError::LineTooLong { size: 14, max: 8 })
        );
    }

    #[test]
    fn test_line_too_long_with_newline() {
        let parser = LineParser::with_max_line_length(8);
        let mut buf = buffer(b"ECHO 123456789\n");

        assert!(matches!(
            parser.parse(&mut buf),
            Err(ParseError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_line_at_limit() {
        let parser = LineParser::with_max_line_length(4);
        let mut buf = buffer(b"PING\n");

        assert!(parser.parse(&mut buf).unwrap().is_some());
    }

    #[test]
    fn test_finish_unterminated_line() {
        let parser = LineParser::new();
        let mut buf = buffer(b"GET foo");

        let req = parser.finish(&mut buf).unwrap().unwrap();
        assert_eq!(req.args, vec!["foo"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_finish_blank_remainder() {
        let parser = LineParser::new();
        let mut buf = buffer(b"  \r");

        assert!(parser.finish(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }
}
