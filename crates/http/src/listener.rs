//! Listening socket and accepted connections
//!
//! [`Listener::create`] goes through the classic socket lifecycle one stage at
//! a time (socket, options, bind, listen) so each failing stage reports its own
//! [`ListenError`] variant. The accept backlog defaults to 1: the server never
//! services more than one connection at a time.
//!
//! Closing a [`Listener`] or a [`Connection`] is idempotent, shutdown paths can
//! call it on resources that were already released.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, trace};

use crate::protocol::{AcceptError, CloseError, ListenError};

/// Default accept backlog
pub const DEFAULT_BACKLOG: u32 = 1;

/// Upper bound of reads spent discarding unread input when closing a client
const DRAIN_LIMIT: usize = 16;

/// Socket-level options applied before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketOptions {
    /// `SO_REUSEADDR`, lets a restarted server rebind while old sockets linger
    pub reuse_address: bool,
    /// `SO_REUSEPORT`, ignored on targets without it
    pub reuse_port: bool,
    /// `SO_KEEPALIVE`, detects peers that vanished from long idle connections
    pub keep_alive: bool,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self { reuse_address: true, reuse_port: true, keep_alive: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    pub addr: IpAddr,
    pub port: u16,
    pub backlog: u32,
    pub options: SocketOptions,
}

impl ListenerConfig {
    /// Listens on `0.0.0.0:<port>` with the default backlog and options
    pub fn new(port: u16) -> Self {
        Self { addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port, backlog: DEFAULT_BACKLOG, options: SocketOptions::default() }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }
}

/// Owns the listening socket.
#[derive(Debug)]
pub struct Listener {
    inner: Option<TcpListener>,
    local_addr: SocketAddr,
}

impl Listener {
    /// Creates, configures, binds and starts listening.
    ///
    /// # Errors
    ///
    /// One [`ListenError`] variant per failing stage. The socket is released
    /// on every failure.
    pub fn create(config: &ListenerConfig) -> Result<Self, ListenError> {
        let addr = config.socket_addr();

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(|source| ListenError::Socket { source })?;
        trace!(%addr, "socket created");

        apply_options(&socket, config.options)?;

        socket.bind(addr).map_err(|source| ListenError::Bind { addr, source })?;
        trace!(%addr, "socket bound");

        let listener = socket.listen(config.backlog).map_err(|source| ListenError::Listen { source })?;
        let local_addr = listener.local_addr().map_err(|source| ListenError::Listen { source })?;

        debug!(%local_addr, backlog = config.backlog, "listener created");
        Ok(Self { inner: Some(listener), local_addr })
    }

    /// Waits for the next client.
    ///
    /// # Errors
    ///
    /// [`AcceptError::Closed`] once the listener has been closed, otherwise
    /// the underlying accept failure.
    pub async fn accept(&self) -> Result<Connection, AcceptError> {
        let listener = self.inner.as_ref().ok_or(AcceptError::Closed)?;
        let (stream, peer_addr) = listener.accept().await?;
        debug!(%peer_addr, "client accepted");
        Ok(Connection::new(stream, peer_addr))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Stops listening. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            debug!(local_addr = %self.local_addr, "listener closed");
        }
    }
}

fn apply_options(socket: &TcpSocket, options: SocketOptions) -> Result<(), ListenError> {
    let option_error = |option: &'static str| move |source: io::Error| ListenError::SocketOption { option, source };

    if options.reuse_address {
        socket.set_reuseaddr(true).map_err(option_error("SO_REUSEADDR"))?;
        trace!("SO_REUSEADDR set");
    }

    if options.reuse_port {
        set_reuseport(socket).map_err(option_error("SO_REUSEPORT"))?;
    }

    if options.keep_alive {
        socket.set_keepalive(true).map_err(option_error("SO_KEEPALIVE"))?;
        trace!("SO_KEEPALIVE set");
    }

    Ok(())
}

#[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos"), not(target_os = "cygwin")))]
fn set_reuseport(socket: &TcpSocket) -> io::Result<()> {
    socket.set_reuseport(true)?;
    trace!("SO_REUSEPORT set");
    Ok(())
}

#[cfg(not(all(unix, not(target_os = "solaris"), not(target_os = "illumos"), not(target_os = "cygwin"))))]
fn set_reuseport(_socket: &TcpSocket) -> io::Result<()> {
    trace!("SO_REUSEPORT unsupported on this target, skipped");
    Ok(())
}

/// One accepted client, scoped to a single request/response exchange.
#[derive(Debug)]
pub struct Connection {
    stream: Option<TcpStream>,
    peer_addr: SocketAddr,
}

impl Connection {
    fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self { stream: Some(stream), peer_addr }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// The underlying stream, `None` once closed
    pub fn stream_mut(&mut self) -> Option<&mut TcpStream> {
        self.stream.as_mut()
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Shuts the stream down and releases it. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// The shutdown failure, the socket is released regardless.
    pub async fn close(&mut self) -> Result<(), CloseError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        let result = match stream.shutdown().await {
            // the peer may already be gone, there is nothing left to flush
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            result => result,
        };

        // closing with unread input resets the connection and may discard the
        // response before the peer read it
        let mut scratch = [0u8; 1024];
        for _ in 0..DRAIN_LIMIT {
            match stream.try_read(&mut scratch) {
                Ok(n) if n > 0 => trace!(discarded = n, "unread input discarded"),
                _ => break,
            }
        }
        drop(stream);

        debug!(peer_addr = %self.peer_addr, "client closed");
        result.map_err(CloseError::from)
    }
}
