//! The accept → serve → close loop
//!
//! The server handles exactly one connection at a time: a client is read,
//! dispatched, answered and closed before the next `accept` is polled. No task
//! is ever spawned, so a client that connects and never sends a full request
//! line holds up everybody else unless a read timeout is configured.
//!
//! Per-connection failures are logged and never stop the loop. The loop ends
//! only when the shutdown future completes, at which point the live
//! connection (if any) and the listener are released.

use std::future::Future;
use std::io;
use std::time::Duration;

use http::StatusCode;
use tracing::{info, warn};

use crate::codec::RequestDecoder;
use crate::connection::HttpConnection;
use crate::listener::{Connection, Listener};
use crate::protocol::{AcceptError, HttpError, ParseError};
use crate::router::Router;

#[derive(Debug)]
pub struct Server {
    listener: Listener,
    router: Router,
    decoder: RequestDecoder,
    read_timeout: Option<Duration>,
}

impl Server {
    pub fn new(listener: Listener, router: Router) -> Self {
        Self { listener, router, decoder: RequestDecoder::new(), read_timeout: None }
    }

    #[must_use]
    pub fn decoder(mut self, decoder: RequestDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Serves clients until `shutdown` completes.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(local_addr = %self.listener.local_addr(), endpoints = self.router.len(), "start serving");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                result = self.serve_next() => {
                    if let Err(AcceptError::Closed) = result {
                        break;
                    }
                }
            }
        }

        self.listener.close();
        info!("server stopped");
    }

    /// Accepts one client and serves it.
    ///
    /// Only accept failures are returned; everything that happens on the
    /// connection is logged here. Dropping the returned future mid-way
    /// releases the connection.
    async fn serve_next(&self) -> Result<(), AcceptError> {
        let mut connection = match self.listener.accept().await {
            Ok(connection) => connection,
            Err(AcceptError::Closed) => return Err(AcceptError::Closed),
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                return Ok(());
            }
        };

        let peer_addr = connection.peer_addr();
        match self.serve(&mut connection).await {
            Ok(status) => info!(%peer_addr, status = status.as_u16(), "request served"),
            Err(e) => warn!(%peer_addr, cause = %e, "error handling request"),
        }

        if let Err(e) = connection.close().await {
            warn!(%peer_addr, cause = %e, "error closing client");
        }
        Ok(())
    }

    async fn serve(&self, connection: &mut Connection) -> Result<StatusCode, HttpError> {
        let Some(stream) = connection.stream_mut() else {
            return Err(ParseError::recv(io::ErrorKind::NotConnected).into());
        };

        let (reader, writer) = stream.split();
        HttpConnection::with_decoder(reader, writer, self.decoder).read_timeout(self.read_timeout).process(&self.router).await
    }
}
