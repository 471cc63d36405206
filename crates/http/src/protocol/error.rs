use std::error::Error;
use std::io;
use std::net::SocketAddr;

use http::StatusCode;
use thiserror::Error;

/// Errors that end the processing of a single connection.
///
/// None of them are fatal to the server: the accept loop logs them and
/// moves on to the next client.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("handler error: {source}")]
    HandlerError {
        #[from]
        source: HandlerError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request too large, filled the whole {max_size} bytes read buffer")]
    TooLarge { max_size: usize },

    #[error("invalid http method, only GET is accepted")]
    InvalidMethod,

    #[error("invalid http uri: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid http version")]
    InvalidVersion,

    #[error("receive error: {source}")]
    Recv {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large(max_size: usize) -> Self {
        Self::TooLarge { max_size }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn recv<E: Into<io::Error>>(e: E) -> Self {
        Self::Recv { source: e.into() }
    }

    /// The status code the client is answered with for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidMethod | Self::InvalidUri { .. } | Self::InvalidVersion => StatusCode::BAD_REQUEST,
            Self::Recv { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("short write: only {written} of {expected} bytes were sent")]
    ShortWrite { written: usize, expected: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn short_write(written: usize, expected: usize) -> Self {
        Self::ShortWrite { written, expected }
    }
}

/// A matched handler failed to produce a response.
#[derive(Error, Debug)]
#[error("handler failed with status {status}: {source}")]
pub struct HandlerError {
    status: StatusCode,
    source: Box<dyn Error + Send + Sync>,
}

impl HandlerError {
    pub fn new<E: Into<Box<dyn Error + Send + Sync>>>(status: StatusCode, source: E) -> Self {
        Self { status, source: source.into() }
    }

    pub fn internal<E: Into<Box<dyn Error + Send + Sync>>>(source: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, source)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no endpoint matches path '{path}'")]
    NotFound { path: String },

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Failures while creating the listening socket, one variant per stage.
#[derive(Error, Debug)]
pub enum ListenError {
    #[error("socket creation failed: {source}")]
    Socket { source: io::Error },

    #[error("setting socket option {option} failed: {source}")]
    SocketOption { option: &'static str, source: io::Error },

    #[error("bind to {addr} failed: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("listen failed: {source}")]
    Listen { source: io::Error },
}

#[derive(Error, Debug)]
pub enum AcceptError {
    #[error("listener is closed")]
    Closed,

    #[error("accept failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
#[error("close failed: {source}")]
pub struct CloseError {
    #[from]
    source: io::Error,
}
