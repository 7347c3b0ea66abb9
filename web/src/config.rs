//! Configuration management for the bingo server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A variable was set but could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}")]
pub struct ConfigError {
    /// Variable name
    pub key: &'static str,
    /// Raw value
    pub value: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log filter directives, `RUST_LOG` syntax
    pub log_level: String,
    /// Per-observer outbound queue length
    pub observer_buffer: usize,
    /// Maximum concurrent observers
    pub max_observers: usize,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "bingo_web=info,bingo_runtime=info,bingo_session=info,tower_http=debug"
                .to_string(),
            observer_buffer: 64,
            max_observers: 1000,
            metrics_enabled: true,
            shutdown_timeout: 10,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to something unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to something unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT", defaults.port)?,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            observer_buffer: parsed(&lookup, "OBSERVER_BUFFER", defaults.observer_buffer)?,
            max_observers: parsed(&lookup, "MAX_OBSERVERS", defaults.max_observers)?,
            metrics_enabled: parsed(&lookup, "METRICS_ENABLED", defaults.metrics_enabled)?,
            shutdown_timeout: parsed(&lookup, "SHUTDOWN_TIMEOUT", defaults.shutdown_timeout)?,
        })
    }

    /// `host:port`
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError { key, value }),
    }
}
