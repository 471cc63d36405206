//! The two kinds of endpoint `pulse` serves
//!
//! - [`PongHandler`]: liveness check, always `Pong!`
//! - [`ServiceStatusHandler`]: `1` if the service runs, `0` if it doesn't

use std::sync::Arc;

use async_trait::async_trait;
use pulse_http::handler::Handler;
use pulse_http::protocol::{HandlerError, Response};
use tracing::info;

use crate::status::StatusProvider;

pub const PONG_BODY: &str = "Pong!\r\n";
pub const ACTIVE_BODY: &str = "1";
pub const INACTIVE_BODY: &str = "0";

#[derive(Debug, Clone, Copy, Default)]
pub struct PongHandler;

#[async_trait]
impl Handler for PongHandler {
    async fn call(&self, _path: &str) -> Result<Response, HandlerError> {
        info!("handling pong request");
        Ok(Response::ok(PONG_BODY))
    }
}

/// Reports whether one service is active.
///
/// The unit name defaults to the request path, so the endpoint `lobby`
/// checks `lobby.service`.
pub struct ServiceStatusHandler {
    provider: Arc<dyn StatusProvider>,
    unit: Option<String>,
}

impl ServiceStatusHandler {
    pub fn new(provider: Arc<dyn StatusProvider>) -> Self {
        Self { provider, unit: None }
    }

    pub fn with_unit(provider: Arc<dyn StatusProvider>, unit: impl Into<String>) -> Self {
        Self { provider, unit: Some(unit.into()) }
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

impl std::fmt::Debug for ServiceStatusHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceStatusHandler").field("unit", &self.unit).finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for ServiceStatusHandler {
    async fn call(&self, path: &str) -> Result<Response, HandlerError> {
        let service = self.unit.as_deref().unwrap_or(path);
        info!(service, "handling service status request");

        let active = self.provider.is_service_active(service).await.map_err(HandlerError::internal)?;
        Ok(Response::ok(if active { ACTIVE_BODY } else { INACTIVE_BODY }))
    }
}
