//! HTTP request line decoder
//!
//! The decoder recognizes exactly one grammar, anchored at the first byte of
//! the buffer:
//!
//! ```text
//! GET /<path> HTTP/<digit>.<digit>
//! ```
//!
//! `<path>` is any run of non-space bytes, possibly empty, CR and LF included.
//! Everything after the version token (the rest of the line, headers, body)
//! is ignored and never parsed.
//!
//! The buffer handed to the decoder is the result of a single read. A buffer
//! that filled the whole read capacity may be truncated, so it is rejected as
//! too large before any parsing happens.
//!
//! # Example
//!
//! ```
//! use pulse_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /findseed HTTP/1.1\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.path(), "findseed");
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, Request};

/// Size of the buffer a request is read into
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 8 * 1024;

const METHOD: &[u8] = b"GET ";
const VERSION_PREFIX: &[u8] = b"HTTP/";

/// Decoder for the single `GET` request line of a connection.
#[derive(Debug, Clone, Copy)]
pub struct RequestDecoder {
    max_bytes: usize,
}

impl RequestDecoder {
    /// Creates a decoder using [`DEFAULT_MAX_REQUEST_BYTES`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder rejecting any buffer of `max_bytes` or more
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// The read buffer capacity, also the too-large threshold.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { max_bytes: DEFAULT_MAX_REQUEST_BYTES }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Decodes the request line held in `src` and consumes the whole buffer.
    ///
    /// Since the request is read in one chunk there is no partial state: this
    /// never returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`ParseError::TooLarge`] if `src` filled the whole read buffer
    /// - [`ParseError::InvalidMethod`], [`ParseError::InvalidUri`] or
    ///   [`ParseError::InvalidVersion`] if the request line does not match
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        ensure!(src.len() < self.max_bytes, ParseError::too_large(self.max_bytes));

        let request = parse_request_line(src)?;
        trace!(path = request.path(), received = src.len(), "parsed request line");

        // trailing header lines and bodies are never looked at
        src.clear();
        Ok(Some(request))
    }
}

fn parse_request_line(src: &[u8]) -> Result<Request, ParseError> {
    let rest = src.strip_prefix(METHOD).ok_or(ParseError::InvalidMethod)?;
    let rest = rest.strip_prefix(b"/").ok_or_else(|| ParseError::invalid_uri("path must start with '/'"))?;

    let path_end = rest.iter().position(|&b| b == b' ').unwrap_or(rest.len());
    let (path, rest) = rest.split_at(path_end);

    let version = rest.strip_prefix(b" ").ok_or(ParseError::InvalidVersion)?;
    ensure!(is_version(version), ParseError::InvalidVersion);

    let path = std::str::from_utf8(path).map_err(ParseError::invalid_uri)?;
    Ok(Request::new(path))
}

/// Checks for `HTTP/<digit>.<digit>` at the start of `src`.
fn is_version(src: &[u8]) -> bool {
    match src.strip_prefix(VERSION_PREFIX) {
        Some([major, b'.', minor, ..]) => major.is_ascii_digit() && minor.is_ascii_digit(),
        _ => false,
    }
}
