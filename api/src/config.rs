//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `QUERYLENS_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `QUERYLENS_PORT`: The port to listen on (default: 8080)
/// - `QUERYLENS_PROFILE_CAPACITY`: Number of profiles kept in memory (default: 100)
/// - `QUERYLENS_DEFAULT_CONNECTION`: Name of the default ORM connection (default: "default")
/// - `QUERYLENS_OUTER_GLUE`: Outer glue of statement log lines (default: unset, " | " applies)
/// - `QUERYLENS_INNER_GLUE`: Inner glue of statement log lines (default: unset, ": " applies)
/// - `QUERYLENS_FORWARD_QUERIES`: Forward every statement to the server log (default: false)
/// - `QUERYLENS_EXPLAIN`: Run explain plans against `ClickHouse` (default: false)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Number of profiles kept in memory.
    pub profile_capacity: usize,
    /// Name of the default ORM connection.
    pub default_connection: String,
    /// Outer glue override.
    pub outer_glue: Option<String>,
    /// Inner glue override.
    pub inner_glue: Option<String>,
    /// Whether statements are also forwarded to the server log.
    pub forward_queries: bool,
    /// Whether explain plans are requested from `ClickHouse`.
    pub explain: bool,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `QUERYLENS_PORT` is set but cannot be parsed as a valid port number
    /// - `QUERYLENS_PROFILE_CAPACITY` is set but is not a number
    /// - `QUERYLENS_FORWARD_QUERIES` or `QUERYLENS_EXPLAIN` is set but is not a boolean
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("QUERYLENS_HOST").unwrap_or(defaults.host);

        let port = std::env::var("QUERYLENS_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("QUERYLENS_PORT must be a port number")?
            .unwrap_or(defaults.port);

        let profile_capacity = std::env::var("QUERYLENS_PROFILE_CAPACITY")
            .ok()
            .map(|c| c.parse::<usize>())
            .transpose()
            .context("QUERYLENS_PROFILE_CAPACITY must be a number")?
            .unwrap_or(defaults.profile_capacity);

        let default_connection = std::env::var("QUERYLENS_DEFAULT_CONNECTION")
            .unwrap_or(defaults.default_connection);

        let forward_queries = env_flag("QUERYLENS_FORWARD_QUERIES")?.unwrap_or(false);
        let explain = env_flag("QUERYLENS_EXPLAIN")?.unwrap_or(false);

        Ok(Self {
            host,
            port,
            profile_capacity,
            default_connection,
            outer_glue: std::env::var("QUERYLENS_OUTER_GLUE").ok(),
            inner_glue: std::env::var("QUERYLENS_INNER_GLUE").ok(),
            forward_queries,
            explain,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination cannot be parsed as a
    /// valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            profile_capacity: shared::storage::DEFAULT_CAPACITY,
            default_connection: "default".to_string(),
            outer_glue: None,
            inner_glue: None,
            forward_queries: false,
            explain: false,
        }
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    std::env::var(name)
        .ok()
        .map(|value| match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow::anyhow!("{name} must be a boolean, got {other:?}")),
        })
        .transpose()
}
