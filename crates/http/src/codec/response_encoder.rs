//! HTTP response encoder
//!
//! Serializes a [`Response`] as
//!
//! ```text
//! HTTP/1.1 <code> <reason>\r\n
//! Content-Length: <n>\r\n
//! \r\n
//! <body>
//! ```
//!
//! No other header is ever emitted.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{Response, SendError};

/// Room for the status line and the `Content-Length` header
const INIT_HEADER_SIZE: usize = 64;

#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE + item.content_length());

        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", item.status().as_str(), item.reason())?;
        write!(FastWrite(dst), "Content-Length: {}\r\n\r\n", item.content_length())?;
        dst.put_slice(item.body());
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Space has been reserved up front, so writes never fail.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
