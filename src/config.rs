//! # Server Configuration
//!
//! Listener and authentication settings for a [`WebServer`](crate::WebServer).
//!
//! Configuration is layered:
//!
//! 1. Built-in defaults (`0.0.0.0`, port 80, realm `esp32-sim`)
//! 2. An optional YAML file
//! 3. Environment overrides
//!
//! ## YAML
//!
//! ```yaml
//! bind_addr: 127.0.0.1
//! port: 8080
//! realm: garage-door
//! ```
//!
//! Missing keys keep their defaults.
//!
//! ## Environment Variables
//!
//! - `FWSIM_BIND_ADDR` - interface to bind (default `0.0.0.0`)
//! - `FWSIM_PORT` - TCP port (default `80`)
//! - `FWSIM_REALM` - realm advertised in Basic challenges (default `esp32-sim`)

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Realm advertised by `request_authentication()` unless configured otherwise.
pub const DEFAULT_REALM: &str = "esp32-sim";

/// Port used by firmware sketches that construct `WebServer server(80)`.
pub const DEFAULT_PORT: u16 = 80;

/// Settings for one simulated web server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind; `0.0.0.0` listens on all interfaces
    pub bind_addr: String,
    /// TCP port; `0` picks an ephemeral port
    pub port: u16,
    /// Realm sent in `WWW-Authenticate: Basic realm="..."`
    pub realm: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            realm: DEFAULT_REALM.to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults with the given port, the way firmware constructs its server.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid for this schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
    }

    /// Apply `FWSIM_*` environment overrides on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `FWSIM_PORT` is not a valid port.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable lookup, so
    /// tests do not have to mutate the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if the port override is not a valid port.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("FWSIM_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = lookup("FWSIM_PORT") {
            self.port = parse_port(&port)?;
        }
        if let Some(realm) = lookup("FWSIM_REALM") {
            self.realm = realm;
        }
        Ok(self)
    }

    /// `bind_addr:port` as passed to the transport.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Parse a port value, accepting surrounding whitespace.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPort`] when `raw` is not an integer in `0..=65535`.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
        value: raw.to_string(),
    })
}
