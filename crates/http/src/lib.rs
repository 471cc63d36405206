//! A minimal, one-connection-at-a-time HTTP front-end
//!
//! This crate provides the request pipeline behind `pulse`: accept a TCP
//! client, read its single `GET` request line, match the path against a fixed
//! table of endpoints, run the matched handler and send back a minimal
//! HTTP/1.1 response, then close the connection.
//!
//! # Features
//!
//! - `GET /<path> HTTP/<digit>.<digit>` request lines, nothing else
//! - Exact, ordered, first-match routing
//! - Responses carry a status line, `Content-Length` and the body only
//! - Every failure is answered (400, 404, 413 or 500) and never stops the
//!   accept loop
//! - Explicit, idempotent resource release on every exit path
//!
//! # Example
//!
//! ```no_run
//! use pulse_http::handler::make_handler;
//! use pulse_http::listener::{Listener, ListenerConfig};
//! use pulse_http::protocol::Response;
//! use pulse_http::router::Router;
//! use pulse_http::server::Server;
//! use tracing::{error, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let router = Router::builder()
//!         .route("", make_handler(|_path: String| async { Ok(Response::ok("Pong!\r\n")) }))
//!         .build();
//!
//!     let listener = match Listener::create(&ListenerConfig::new(4961)) {
//!         Ok(listener) => listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     Server::new(listener, router)
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`listener`]: listening socket and accepted connections
//! - [`codec`]: request line decoding and response encoding
//! - [`protocol`]: request, response and error types
//! - [`handler`]: the [`handler::Handler`] trait
//! - [`router`]: the ordered endpoint table
//! - [`connection`]: one request/response exchange
//! - [`server`]: the accept loop
//!
//! # Limitations
//!
//! - One connection at a time, one request per connection
//! - The request line must arrive in a single read
//! - Headers, bodies and query strings are ignored
//! - No TLS support (use a reverse proxy for HTTPS)

pub mod codec;
pub mod connection;
pub mod handler;
pub mod listener;
pub mod protocol;
pub mod router;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
