//! HTTP codec module for decoding requests and encoding responses
//!
//! - [`RequestDecoder`]: decodes the request line read off a connection
//! - [`ResponseEncoder`]: encodes a status line, `Content-Length` and body
//!
//! Both implement the `tokio_util` codec traits over [`BytesMut`](bytes::BytesMut),
//! so they can be driven by hand (one read, one write per connection) or
//! plugged into framed IO.
//!
//! # Example
//!
//! ```
//! use pulse_http::codec::{RequestDecoder, ResponseEncoder};
//! use pulse_http::protocol::Response;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let request = RequestDecoder::new().decode(&mut request_buffer).unwrap().unwrap();
//! assert_eq!(request.path(), "");
//!
//! let mut response_buffer = BytesMut::new();
//! ResponseEncoder::new().encode(Response::ok("Pong!\r\n"), &mut response_buffer).unwrap();
//! assert!(response_buffer.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

mod request_decoder;
mod response_encoder;

pub use request_decoder::DEFAULT_MAX_REQUEST_BYTES;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
