use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::RequestDecoder;
use crate::protocol::{ParseError, Request};

/// Reads the request of a connection with a single bounded `read` call.
///
/// A request line split across several packets is not reassembled: whatever
/// the first read returns is all the decoder gets to see.
#[derive(Debug)]
pub struct MessageReader<R> {
    reader: R,
    decoder: RequestDecoder,
    read_timeout: Option<Duration>,
}

impl<R> MessageReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R, decoder: RequestDecoder) -> Self {
        Self { reader, decoder, read_timeout: None }
    }

    pub fn set_read_timeout(&mut self, read_timeout: Option<Duration>) {
        self.read_timeout = read_timeout;
    }

    pub async fn read_request(&mut self) -> Result<Request, ParseError> {
        let mut buffer = BytesMut::zeroed(self.decoder.max_bytes());

        let read = match self.read_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.reader.read(&mut buffer[..]))
                .await
                .map_err(|elapsed| io::Error::new(io::ErrorKind::TimedOut, elapsed))??,
            None => self.reader.read(&mut buffer[..]).await?,
        };
        trace!(bytes = read, capacity = self.decoder.max_bytes(), "request received");

        buffer.truncate(read);
        // the request line arrives in one chunk, the decoder never asks for more data
        self.decoder.decode(&mut buffer)?.ok_or(ParseError::InvalidMethod)
    }
}
