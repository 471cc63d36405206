//! HTTP response values.
//!
//! A [`Response`] is built once by a handler (or by the connection for error
//! paths) and consumed once by the [`ResponseEncoder`](crate::codec::ResponseEncoder).

use bytes::Bytes;
use http::StatusCode;

/// A status line plus a body. `Content-Length` is always derived from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    reason: &'static str,
    body: Bytes,
}

impl Response {
    /// Creates a response with the reason phrase matching `status`.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, reason: reason_phrase(status), body: body.into() }
    }

    /// A `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// A response with an empty body, used for every error path.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, Bytes::new())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The value sent in the `Content-Length` header.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// Reason phrase sent on the status line.
///
/// 413 keeps its RFC 2616 wording, everything else uses the canonical reason
/// known by the `http` crate.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Request Entity Too Large",
        status => status.canonical_reason().unwrap_or("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_phrases() {
        assert_eq!(reason_phrase(StatusCode::OK), "OK");
        assert_eq!(reason_phrase(StatusCode::BAD_REQUEST), "Bad Request");
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(reason_phrase(StatusCode::PAYLOAD_TOO_LARGE), "Request Entity Too Large");
        assert_eq!(reason_phrase(StatusCode::INTERNAL_SERVER_ERROR), "Internal Server Error");
    }

    #[test]
    fn empty_response_has_zero_length() {
        let response = Response::empty(StatusCode::NOT_FOUND);
        assert_eq!(response.content_length(), 0);
        assert_eq!(response.reason(), "Not Found");
        assert!(response.body().is_empty());
    }

    #[test]
    fn content_length_follows_body() {
        let response = Response::ok("Pong!\r\n");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_length(), 7);
    }
}
