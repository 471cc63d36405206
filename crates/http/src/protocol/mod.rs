//! Protocol types shared by the codec, router and connection layers.
//!
//! - **Request Processing** ([`request`]): the decoded request line
//!   - [`Request`]: the requested path, nothing else
//!
//! - **Response Processing** ([`response`]): status line and body
//!   - [`Response`]: status, reason phrase and body
//!
//! - **Error Handling** ([`error`]): the per-connection error taxonomy
//!   - [`HttpError`]: top-level error returned for a connection
//!   - [`ParseError`]: receive, too-large and malformed request failures
//!   - [`SendError`]: response writing failures
//!   - [`DispatchError`] and [`HandlerError`]: routing outcomes
//!   - [`ListenError`], [`AcceptError`], [`CloseError`]: socket lifecycle

mod request;
pub use request::Request;

mod response;
pub use response::Response;
pub use response::reason_phrase;

mod error;
pub use error::AcceptError;
pub use error::CloseError;
pub use error::DispatchError;
pub use error::HandlerError;
pub use error::HttpError;
pub use error::ListenError;
pub use error::ParseError;
pub use error::SendError;
