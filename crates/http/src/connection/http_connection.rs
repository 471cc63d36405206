use std::time::Duration;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::codec::RequestDecoder;
use crate::connection::message_reader::MessageReader;
use crate::connection::message_writer::MessageWriter;
use crate::protocol::{DispatchError, HttpError, Response};
use crate::router::Router;

/// Initial capacity of the response buffer
const WRITE_BUFFER_SIZE: usize = 1024;

/// One request/response exchange over a reader and a writer.
///
/// `HttpConnection` runs the whole pipeline for a single connection:
/// - read the request with one bounded read and decode its request line
/// - dispatch the path to the router
/// - encode the outcome and send it with one write
///
/// Every outcome is answered before returning, errors included:
///
/// | outcome                     | status | returned                        |
/// |-----------------------------|--------|---------------------------------|
/// | handler succeeded           | 200    | `Ok(status)`                    |
/// | no endpoint matched         | 404    | `Ok(404)`                       |
/// | request filled the buffer   | 413    | `Err(HttpError::RequestError)`  |
/// | malformed request line      | 400    | `Err(HttpError::RequestError)`  |
/// | read failed or timed out    | 500    | `Err(HttpError::RequestError)`  |
/// | handler failed              | 500    | `Err(HttpError::HandlerError)`  |
///
/// A failure to send the response itself is returned as
/// `HttpError::ResponseError`.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_decoder(reader, writer, RequestDecoder::new())
    }

    pub fn with_decoder(reader: R, writer: W, decoder: RequestDecoder) -> Self {
        Self { reader: MessageReader::new(reader, decoder), writer: MessageWriter::with_capacity(writer, WRITE_BUFFER_SIZE) }
    }

    /// Bounds the time spent waiting for the request, `None` waits forever.
    #[must_use]
    pub fn read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.reader.set_read_timeout(read_timeout);
        self
    }

    /// Serves the single request carried by this connection.
    ///
    /// # Errors
    ///
    /// See the table on [`HttpConnection`]; the error is returned after the
    /// matching error response was sent.
    pub async fn process(mut self, router: &Router) -> Result<StatusCode, HttpError> {
        let request = match self.reader.read_request().await {
            Ok(request) => request,
            Err(e) => {
                debug!(cause = %e, "can't read request");
                self.send_response(Response::empty(e.status_code())).await?;
                return Err(e.into());
            }
        };

        info!(path = request.path(), "handling request");

        match router.dispatch(&request).await {
            Ok(response) => self.send_response(response).await,
            Err(DispatchError::NotFound { path }) => {
                debug!(path = %path, "no matching endpoint");
                self.send_response(Response::empty(StatusCode::NOT_FOUND)).await
            }
            Err(DispatchError::Handler(e)) => {
                debug!(path = request.path(), cause = %e, "handler failed");
                self.send_response(Response::empty(StatusCode::INTERNAL_SERVER_ERROR)).await?;
                Err(e.into())
            }
        }
    }

    async fn send_response(&mut self, response: Response) -> Result<StatusCode, HttpError> {
        let status = response.status();
        debug!(status = status.as_u16(), reason = response.reason(), "sending response");

        self.writer.write(response)?;
        self.writer.flush().await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::{HandlerError, ParseError, SendError};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    fn router() -> Router {
        Router::builder()
            .route("", make_handler(|_path: String| async { Ok(Response::ok("Pong!\r\n")) }))
            .route("gameserver01", make_handler(|_path: String| async { Ok(Response::ok("1")) }))
            .route("proxy", make_handler(|_path: String| async { Ok(Response::ok("0")) }))
            .route("httpd", make_handler(|_path: String| async { Err(HandlerError::internal(io::Error::other("no bus"))) }))
            .build()
    }

    async fn exchange(request: &[u8]) -> (Result<StatusCode, HttpError>, Vec<u8>) {
        exchange_with(request, RequestDecoder::new()).await
    }

    async fn exchange_with(request: &[u8], decoder: RequestDecoder) -> (Result<StatusCode, HttpError>, Vec<u8>) {
        let mut written = Vec::new();
        let result = HttpConnection::with_decoder(request, &mut written, decoder).process(&router()).await;
        (result, written)
    }

    #[tokio::test]
    async fn pong() {
        let (result, written) = exchange(b"GET / HTTP/1.1\r\n\r\n").await;
        assert_eq!(result.unwrap(), StatusCode::OK);
        assert_eq!(written, b"HTTP/1.1 200 OK\r\nContent-Length: 7\r\n\r\nPong!\r\n");
    }

    #[tokio::test]
    async fn service_active_and_inactive() {
        let (_, written) = exchange(b"GET /gameserver01 HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert_eq!(written, b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\n1");

        let (_, written) = exchange(b"GET /proxy HTTP/1.0\r\n\r\n").await;
        assert_eq!(written, b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\n0");
    }

    #[tokio::test]
    async fn not_found_is_not_an_error() {
        let (result, written) = exchange(b"GET /nothing-here HTTP/1.1\r\n\r\n").await;
        assert_eq!(result.unwrap(), StatusCode::NOT_FOUND);
        assert_eq!(written, b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn carriage_return_in_path_is_routed() {
        let (result, written) = exchange(b"GET /a\rb HTTP/1.1\r\n\r\n").await;
        assert_eq!(result.unwrap(), StatusCode::NOT_FOUND);
        assert_eq!(written, b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn bad_request() {
        for request in [&b"POST / HTTP/1.1\r\n\r\n"[..], b"GET nopath", b"GET / HTTP/one\r\n", b""] {
            let (result, written) = exchange(request).await;
            assert!(matches!(result, Err(HttpError::RequestError { .. })));
            assert_eq!(written, b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
        }
    }

    #[tokio::test]
    async fn too_large() {
        let request = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(64));
        let (result, written) = exchange_with(request.as_bytes(), RequestDecoder::with_max_bytes(32)).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::TooLarge { max_size: 32 } })));
        assert_eq!(written, b"HTTP/1.1 413 Request Entity Too Large\r\nContent-Length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn handler_error() {
        let (result, written) = exchange(b"GET /httpd HTTP/1.1\r\n\r\n").await;
        assert!(matches!(result, Err(HttpError::HandlerError { .. })));
        assert_eq!(written, b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n");
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }
    }

    #[tokio::test]
    async fn receive_error() {
        let mut written = Vec::new();
        let result = HttpConnection::new(FailingReader, &mut written).process(&router()).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::Recv { .. } })));
        assert_eq!(written, b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn stalled_read_times_out() {
        let (_client, server) = tokio::io::duplex(64);
        let mut written = Vec::new();

        let result = HttpConnection::new(server, &mut written)
            .read_timeout(Some(Duration::from_millis(20)))
            .process(&router())
            .await;

        match result {
            Err(HttpError::RequestError { source: ParseError::Recv { source } }) => {
                assert_eq!(source.kind(), io::ErrorKind::TimedOut);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(written, b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n");
    }

    /// Accepts at most `limit` bytes per write
    struct ShortWriter {
        limit: usize,
    }

    impl AsyncWrite for ShortWriter {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
            Poll::Ready(Ok(buf.len().min(self.limit)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn short_write_is_not_retried() {
        let result = HttpConnection::new(&b"GET / HTTP/1.1\r\n\r\n"[..], ShortWriter { limit: 10 }).process(&router()).await;

        assert!(matches!(
            result,
            Err(HttpError::ResponseError { source: SendError::ShortWrite { written: 10, expected: 45 } })
        ));
    }
}
