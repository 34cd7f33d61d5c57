//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit CLI flag, then environment
//! variable, then built-in default.

use std::str::FromStr;
use std::time::Duration;

use crate::notify::DEFAULT_QUEUE_CAPACITY;
use crate::session::{DEFAULT_IDLE_TIMEOUT, DEFAULT_SESSION_GRACE};
use crate::types::SERVER_NAME;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime settings shared by the handler and the transports.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name reported in `serverInfo` and on `/health`.
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Static bearer token for the HTTP transport. `None` disables auth.
    pub token: Option<String>,
    pub session_grace: Duration,
    pub idle_timeout: Duration,
    pub queue_capacity: usize,
    pub reap_interval: Duration,
    /// Interval between SSE keep-alive pings.
    pub keepalive: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            token: None,
            session_grace: DEFAULT_SESSION_GRACE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            reap_interval: Duration::from_secs(30),
            keepalive: Duration::from_secs(15),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by any environment variables that are set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env_string("MCP_SERVER_NAME").unwrap_or(defaults.name),
            host: env_string("MCP_HOST").unwrap_or(defaults.host),
            port: env_parse("MCP_PORT").unwrap_or(defaults.port),
            token: env_string("WORKBENCH_TOKEN").or(defaults.token),
            session_grace: env_parse("WORKBENCH_SESSION_GRACE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_grace),
            idle_timeout: env_parse("WORKBENCH_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            queue_capacity: env_parse::<usize>("WORKBENCH_QUEUE_CAPACITY")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.queue_capacity),
            ..defaults
        }
    }

    /// `host:port` for binding the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {key}={raw}: not a valid value");
            None
        }
    }
}

/// Resolve a setting: explicit value first, then the configured one.
pub fn resolve<T>(explicit: Option<T>, configured: T) -> T {
    explicit.unwrap_or(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.queue_capacity, 256);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_explicit_wins() {
        assert_eq!(resolve(Some(9000u16), DEFAULT_PORT), 9000);
        assert_eq!(resolve(None, DEFAULT_PORT), DEFAULT_PORT);
    }
}
