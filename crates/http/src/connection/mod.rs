//! HTTP connection handling module
//!
//! This module runs the request/response exchange of one accepted client.
//!
//! # Components
//!
//! - [`HttpConnection`]: the pipeline for a single connection:
//!   - Reads the request with one bounded read
//!   - Decodes the request line
//!   - Dispatches the path to the [`Router`](crate::router::Router)
//!   - Answers every outcome, error paths included
//!
//! There is no keep-alive: a connection carries exactly one request, after
//! which the caller closes it.

mod http_connection;
mod message_reader;
mod message_writer;

pub use http_connection::HttpConnection;
