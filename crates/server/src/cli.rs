use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

#[derive(Debug, Parser)]
#[command(name = "pulse")]
#[command(about = "Report whether systemd services are running over plain HTTP")]
#[command(version)]
pub struct Cli {
    /// Configuration file, built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Loads the configuration file, if any, and applies the overrides.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(log_level) = &self.log_level {
            config.log_level.clone_from(log_level);
        }

        config.validate()?;
        Ok(config)
    }
}
