//! `pulse.toml` configuration
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! server on port 4961 with the built-in endpoint table.

use std::collections::HashSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pulse_http::codec::{DEFAULT_MAX_REQUEST_BYTES, RequestDecoder};
use pulse_http::listener::{DEFAULT_BACKLOG, ListenerConfig, SocketOptions};
use pulse_http::router::Router;
use serde::Deserialize;
use thiserror::Error;
use tracing::{Level, debug, warn};

use crate::handlers::{PongHandler, ServiceStatusHandler};
use crate::status::StatusProvider;

pub const DEFAULT_PORT: u16 = 4961;

/// Smallest request buffer that still fits a short request line.
pub const MIN_REQUEST_BYTES: usize = 16;

/// Services checked when no endpoint table is configured.
pub const DEFAULT_SERVICES: [&str; 11] =
    ["findseed", "tas8999", "purrify", "qotd", "gameserver01", "proxy", "lobby", "tino", "httpd", "postgresql", "reposilite"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse configuration: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    fn invalid<S: ToString>(reason: S) -> Self {
        Self::Invalid { reason: reason.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: u16,
    pub address: IpAddr,
    pub backlog: u32,
    pub max_request_bytes: usize,
    /// Deadline for receiving the request line, `0` waits forever.
    pub read_timeout_ms: u64,
    pub log_level: String,
    /// `systemctl` executable, looked up in `PATH` when not absolute.
    pub systemctl: PathBuf,
    pub socket: SocketConfig,
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            backlog: DEFAULT_BACKLOG,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            read_timeout_ms: 0,
            log_level: "info".to_owned(),
            systemctl: PathBuf::from("systemctl"),
            socket: SocketConfig::default(),
            endpoints: default_endpoints(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocketConfig {
    pub reuse_address: bool,
    pub reuse_port: bool,
    pub keep_alive: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        let options = SocketOptions::default();
        Self { reuse_address: options.reuse_address, reuse_port: options.reuse_port, keep_alive: options.keep_alive }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Request path without the leading `/`, `""` is the root.
    pub path: String,
    pub handler: HandlerKind,
    /// Unit checked by a `service` endpoint, defaults to `path`.
    #[serde(default)]
    pub unit: Option<String>,
}

impl EndpointConfig {
    pub fn pong(path: impl Into<String>) -> Self {
        Self { path: path.into(), handler: HandlerKind::Pong, unit: None }
    }

    pub fn service(path: impl Into<String>) -> Self {
        Self { path: path.into(), handler: HandlerKind::Service, unit: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Pong,
    Service,
}

fn default_endpoints() -> Vec<EndpointConfig> {
    std::iter::once(EndpointConfig::pong("")).chain(DEFAULT_SERVICES.into_iter().map(EndpointConfig::service)).collect()
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file can't be read or holds an invalid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), endpoints = config.endpoints.len(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_bytes < MIN_REQUEST_BYTES {
            return Err(ConfigError::invalid(format!(
                "max_request_bytes must be at least {MIN_REQUEST_BYTES}, got {}",
                self.max_request_bytes
            )));
        }
        if self.backlog == 0 {
            return Err(ConfigError::invalid("backlog must be at least 1"));
        }
        self.parse_log_level()?;

        for endpoint in &self.endpoints {
            if endpoint.path.starts_with('/') {
                return Err(ConfigError::invalid(format!("endpoint path {:?} must not start with '/'", endpoint.path)));
            }
            if endpoint.path.contains(' ') {
                return Err(ConfigError::invalid(format!("endpoint path {:?} must not contain spaces", endpoint.path)));
            }
        }
        Ok(())
    }

    fn parse_log_level(&self) -> Result<Level, ConfigError> {
        self.log_level.parse().map_err(|e| ConfigError::invalid(format!("log_level {:?}: {e}", self.log_level)))
    }

    /// Maximum level for the log subscriber, `INFO` if `log_level` is invalid.
    pub fn max_level(&self) -> Level {
        self.parse_log_level().unwrap_or(Level::INFO)
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            addr: self.address,
            port: self.port,
            backlog: self.backlog,
            options: SocketOptions {
                reuse_address: self.socket.reuse_address,
                reuse_port: self.socket.reuse_port,
                keep_alive: self.socket.keep_alive,
            },
        }
    }

    pub fn decoder(&self) -> RequestDecoder {
        RequestDecoder::with_max_bytes(self.max_request_bytes)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Builds the endpoint table in configuration order.
    ///
    /// A path listed twice is kept, but only its first entry is reachable.
    pub fn build_router(&self, provider: &Arc<dyn StatusProvider>) -> Router {
        let mut seen = HashSet::new();
        let mut builder = Router::builder();

        for endpoint in &self.endpoints {
            if !seen.insert(endpoint.path.as_str()) {
                warn!(path = %endpoint.path, "endpoint is shadowed by an earlier one with the same path");
            }

            builder = match (endpoint.handler, &endpoint.unit) {
                (HandlerKind::Pong, _) => builder.route(endpoint.path.clone(), PongHandler),
                (HandlerKind::Service, None) => builder.route(endpoint.path.clone(), ServiceStatusHandler::new(Arc::clone(provider))),
                (HandlerKind::Service, Some(unit)) => {
                    builder.route(endpoint.path.clone(), ServiceStatusHandler::with_unit(Arc::clone(provider), unit.clone()))
                }
            };
        }
        builder.build()
    }
}
