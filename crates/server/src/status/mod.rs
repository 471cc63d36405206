//! Service status lookups
//!
//! Handlers never talk to the system manager directly, they go through a
//! [`StatusProvider`] shared behind an `Arc`. The provider is connected once
//! at startup and disconnected once at shutdown.

mod systemd;

use async_trait::async_trait;
use thiserror::Error;

pub use systemd::SystemdStatus;

#[cfg(test)]
use mockall::automock;

/// Answers whether a named service is currently running.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Returns `true` iff the unit `<name>.service` is active.
    async fn is_service_active(&self, name: &str) -> Result<bool, StatusError>;

    /// Releases the connection to the system manager.
    async fn disconnect(&self);
}

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("cannot reach the system manager: {reason}")]
    Connect { reason: String },

    #[error("failed to query {unit}: {reason}")]
    Query { unit: String, reason: String },

    #[error("invalid unit name {name:?}")]
    InvalidUnitName { name: String },
}

impl StatusError {
    pub fn connect<S: ToString>(reason: S) -> Self {
        Self::Connect { reason: reason.to_string() }
    }

    pub fn query<S: ToString>(unit: &str, reason: S) -> Self {
        Self::Query { unit: unit.to_owned(), reason: reason.to_string() }
    }
}
