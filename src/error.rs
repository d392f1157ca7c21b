//! Error types surfaced by server startup and configuration loading.
//!
//! Everything that happens *inside* a dispatch (routing misses, malformed
//! credentials, handler panics) is absorbed locally and only ever reaches the
//! client as an HTTP status code. The types here cover the remaining failures
//! that the embedding process has to see.

use std::fmt;

/// Failure to start or control the HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// The listener could not be bound to the requested address
    Bind {
        /// Address that was requested (e.g. `0.0.0.0:80`)
        addr: String,
        /// Reason reported by the transport
        reason: String,
    },
    /// `begin()` was called on a server that is already serving
    AlreadyStarted,
    /// A serving-only operation was called before `begin()`
    NotStarted,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind { addr, reason } => {
                write!(f, "failed to bind HTTP listener on {addr}: {reason}")
            }
            ServerError::AlreadyStarted => write!(f, "web server is already serving"),
            ServerError::NotStarted => write!(f, "web server has not been started"),
        }
    }
}

impl std::error::Error for ServerError {}

/// Failure to load [`ServerConfig`](crate::config::ServerConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The configuration file is not valid YAML for the expected schema
    Parse {
        /// Path of the file
        path: String,
        /// Parser message
        message: String,
    },
    /// A port value (file or environment) is not a valid TCP port
    InvalidPort {
        /// The offending raw value
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config file '{path}': {source}")
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config file '{path}': {message}")
            }
            ConfigError::InvalidPort { value } => {
                write!(f, "invalid port '{value}': expected an integer in 0..=65535")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_mentions_address() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:80".to_string(),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.0.0.0:80"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn invalid_port_display() {
        let err = ConfigError::InvalidPort {
            value: "http".to_string(),
        };
        assert!(err.to_string().contains("'http'"));
    }
}
