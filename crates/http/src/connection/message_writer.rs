use crate::codec::ResponseEncoder;
use crate::ensure;
use crate::protocol::{Response, SendError};
use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::trace;

/// Encodes responses into a buffer and sends it with a single `write` call.
///
/// There is no resend: a short write is reported as
/// [`SendError::ShortWrite`] and the connection is expected to be abandoned.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new() }
    }

    #[inline]
    pub fn write(&mut self, item: Response) -> Result<(), SendError> {
        self.encoder.encode(item, &mut self.buffer)
    }

    /// Sends the encoded bytes and returns how many were written.
    pub async fn flush(&mut self) -> Result<usize, SendError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        let expected = self.buffer.len();
        let written = self.writer.write(self.buffer.as_ref()).await?;
        self.buffer.clear();
        ensure!(written == expected, SendError::short_write(written, expected));

        self.writer.flush().await?;
        trace!(bytes = written, "response sent");
        Ok(written)
    }
}
