//! The decoded request.
//!
//! Only the path of the request line survives decoding: headers, body and
//! query strings are never looked at.

/// A decoded `GET` request.
///
/// The path is everything between the leading `/` and the version token,
/// so the root request `GET / HTTP/1.1` carries the empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    path: String,
}

impl Request {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the requested path, without its leading `/`.
    pub fn path(&self) -> &str {
        &self.path
    }
}
