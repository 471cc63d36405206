//! Endpoint routing
//!
//! A [`Router`] is an ordered, fixed table of `(path, handler)` pairs built once
//! at startup. Matching is exact and byte-for-byte: no prefix
//! matching, no trailing-slash normalization, no percent-decoding. When two
//! endpoints share a path only the first one registered is reachable.

use std::fmt;

use tracing::trace;

use crate::handler::Handler;
use crate::protocol::{DispatchError, Request, Response};

/// A registered `(path, handler)` pair
pub struct Endpoint {
    path: String,
    handler: Box<dyn Handler>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self { path: path.into(), handler: Box::new(handler) }
    }

    /// Path this endpoint answers, without the leading `/`
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Main router structure that handles request routing
#[derive(Debug)]
pub struct Router {
    endpoints: Vec<Endpoint>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Returns the first endpoint whose path equals `path`
    pub fn at(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.path == path)
    }

    /// Invokes the handler of the first matching endpoint.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotFound`] if no endpoint matches
    /// - [`DispatchError::Handler`] if the matched handler failed
    pub async fn dispatch(&self, request: &Request) -> Result<Response, DispatchError> {
        let path = request.path();
        let Some(endpoint) = self.at(path) else {
            trace!(path, "no matching endpoint");
            return Err(DispatchError::NotFound { path: path.to_owned() });
        };

        let response = endpoint.handler.call(path).await?;
        trace!(path, status = response.status().as_u16(), "handler finished");
        Ok(response)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RouterBuilder {
    endpoints: Vec<Endpoint>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Appends an endpoint; registration order is match order.
    pub fn route(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.endpoints.push(Endpoint::new(path, handler));
        self
    }

    pub fn build(self) -> Router {
        Router { endpoints: self.endpoints }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::HandlerError;
    use http::StatusCode;
    use std::io;

    fn router() -> Router {
        Router::builder()
            .route("", make_handler(|_path: String| async { Ok(Response::ok("Pong!\r\n")) }))
            .route("lobby", make_handler(|_path: String| async { Ok(Response::ok("1")) }))
            .route("lobby", make_handler(|_path: String| async { Ok(Response::ok("shadowed")) }))
            .route("broken", make_handler(|_path: String| async { Err(HandlerError::internal(io::Error::other("bus down"))) }))
            .build()
    }

    #[test]
    fn at_exact_match_only() {
        let router = router();
        assert_eq!(router.len(), 4);

        assert_eq!(router.at("").map(Endpoint::path), Some(""));
        assert_eq!(router.at("lobby").map(Endpoint::path), Some("lobby"));
        assert!(router.at("Lobby").is_none());
        assert!(router.at("lobby/").is_none());
        assert!(router.at("lob").is_none());
        assert!(router.at("/lobby").is_none());
    }

    #[tokio::test]
    async fn dispatch_root() {
        let response = router().dispatch(&Request::new("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&response.body()[..], b"Pong!\r\n");
    }

    #[tokio::test]
    async fn dispatch_first_match_wins() {
        let response = router().dispatch(&Request::new("lobby")).await.unwrap();
        assert_eq!(&response.body()[..], b"1");
    }

    #[tokio::test]
    async fn dispatch_not_found() {
        let result = router().dispatch(&Request::new("missing")).await;
        assert!(matches!(result, Err(DispatchError::NotFound { path }) if path == "missing"));
    }

    #[tokio::test]
    async fn dispatch_handler_error() {
        let result = router().dispatch(&Request::new("broken")).await;
        match result {
            Err(DispatchError::Handler(e)) => assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR),
            other => panic!("unexpected dispatch result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_router_finds_nothing() {
        let router = Router::builder().build();
        assert!(router.is_empty());
        assert!(matches!(router.dispatch(&Request::new("")).await, Err(DispatchError::NotFound { .. })));
    }
}
