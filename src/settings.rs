//! Process settings for the `rate-engine` binary.
//!
//! Settings come from `RATE_ENGINE_*` environment variables, optionally seeded
//! from a `.env` file. Command line flags override them.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::ServiceError;

/// Default rate card directory.
pub const DEFAULT_CONFIG_DIR: &str = "./config/catering";
/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings for the HTTP service and its logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Directory holding the rate card.
    pub config_dir: PathBuf,
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerSettings {
    /// Loads settings from the process environment, reading `.env` first if
    /// present.
    pub fn load() -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("RATE_ENGINE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ServiceError::Settings {
                key: "RATE_ENGINE_PORT".to_string(),
                message: format!("'{}' is not a valid port", raw),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            config_dir: lookup("RATE_ENGINE_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_dir),
            host: lookup("RATE_ENGINE_HOST").unwrap_or(defaults.host),
            port,
            log_level: lookup("RATE_ENGINE_LOG").unwrap_or(defaults.log_level),
        })
    }

    /// Returns the address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServiceError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(|_| ServiceError::Settings {
            key: "RATE_ENGINE_HOST".to_string(),
            message: format!("'{}' is not an IP address", self.host),
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}
