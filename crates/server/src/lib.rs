//! `pulse`: report whether systemd services are running over plain HTTP
//!
//! `GET /` answers `Pong!`, `GET /<service>` answers `1` when
//! `<service>.service` is active and `0` otherwise. The request pipeline
//! lives in [`pulse_http`]; this crate wires it to the system manager.
//!
//! - [`status`]: the [`status::StatusProvider`] capability and its systemd
//!   implementation
//! - [`handlers`]: the pong and service status handlers
//! - [`config`]: the TOML configuration and the endpoint table
//! - [`cli`]: command line arguments

pub mod cli;
pub mod config;
pub mod handlers;
pub mod status;
