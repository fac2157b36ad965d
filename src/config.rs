//! Client configuration for the worker event publisher.
//!
//! Values come from three layers: compiled defaults tuned for a worker that
//! lives for minutes, an optional YAML file, and environment variables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
pub const DEFAULT_CLIENT_NAME: &str = "swarm-worker";

pub const SUBJECT_SESSION_COMPLETED: &str = "swarm.cc.session.completed";
pub const SUBJECT_SESSION_FAILED: &str = "swarm.cc.session.failed";
pub const EVENT_SESSION_COMPLETED: &str = "cc.session.completed";
pub const EVENT_SESSION_FAILED: &str = "cc.session.failed";

/// Destination subject and event-type label for one kind of event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub subject: String,
    pub event_type: String,
}

impl Route {
    pub fn new(subject: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            event_type: event_type.into(),
        }
    }
}

/// Routes for the two terminal session outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRoutes {
    pub completed: Route,
    pub failed: Route,
}

impl Default for SessionRoutes {
    fn default() -> Self {
        Self {
            completed: Route::new(SUBJECT_SESSION_COMPLETED, EVENT_SESSION_COMPLETED),
            failed: Route::new(SUBJECT_SESSION_FAILED, EVENT_SESSION_FAILED),
        }
    }
}

/// Connection and publishing options
///
/// # Example
/// ```yaml
/// url: nats://nats.swarm.svc:4222
/// client_name: swarm-worker
/// max_reconnects: 3
/// publish_timeout_ms: 5000
/// routes:
///   completed:
///     subject: swarm.cc.session.completed
///     event_type: cc.session.completed
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Broker address
    pub url: String,

    /// Auth token; connects unauthenticated when absent
    pub token: Option<String>,

    /// Connection name reported to the broker
    pub client_name: String,

    /// Value of the envelope `source` field
    pub source: String,

    pub connect_timeout_ms: u64,
    pub reconnect_wait_ms: u64,

    /// Reconnect attempts before the connection is given up
    pub max_reconnects: usize,

    pub publish_timeout_ms: u64,
    pub drain_timeout_ms: u64,

    pub routes: SessionRoutes,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NATS_URL.to_string(),
            token: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            source: DEFAULT_CLIENT_NAME.to_string(),
            connect_timeout_ms: 5_000,  // handshake
            reconnect_wait_ms: 2_000,   // between reconnect attempts
            max_reconnects: 3,          // short-lived process: fail fast
            publish_timeout_ms: 5_000,  // per-publish ack deadline
            drain_timeout_ms: 5_000,    // flush on close
            routes: SessionRoutes::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `NATS_URL`, `NATS_TOKEN` and `SWARM_EVENTS_SOURCE`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid YAML
    ///
    /// # Example
    /// ```ignore
    /// let config = ClientConfig::load_from_file("swarm-events.yaml")?.with_env_overrides();
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply environment variables on top of the current values
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env("NATS_URL") {
            self.url = url;
        }
        if let Some(token) = non_empty_env("NATS_TOKEN") {
            self.token = Some(token);
        }
        if let Some(source) = non_empty_env("SWARM_EVENTS_SOURCE") {
            self.source = source;
        }
        self
    }

    /// Token to authenticate with, ignoring an empty string
    pub fn auth_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_wait(&self) -> Duration {
        Duration::from_millis(self.reconnect_wait_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    /// Worst-case time spent reconnecting before the connection is declared dead
    pub fn reconnect_budget(&self) -> Duration {
        let attempts = u32::try_from(self.max_reconnects).unwrap_or(u32::MAX);
        self.reconnect_wait().checked_mul(attempts).unwrap_or(Duration::MAX)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fail_fast() {
        let config = ClientConfig::default();

        assert_eq!(config.url, DEFAULT_NATS_URL);
        assert_eq!(config.max_reconnects, 3);
        assert_eq!(config.reconnect_budget(), Duration::from_secs(6));
        assert_eq!(config.publish_timeout(), Duration::from_secs(5));
        assert!(config.auth_token().is_none());
        assert_eq!(config.routes.completed.subject, SUBJECT_SESSION_COMPLETED);
        assert_eq!(config.routes.failed.event_type, EVENT_SESSION_FAILED);
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let config = ClientConfig {
            token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.auth_token().is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ClientConfig::from_yaml(
            "url: nats://broker:4222\nmax_reconnects: 1\nroutes:\n  failed:\n    subject: test.failed\n    event_type: test.failed\n",
        )
        .unwrap();

        assert_eq!(config.url, "nats://broker:4222");
        assert_eq!(config.max_reconnects, 1);
        assert_eq!(config.publish_timeout_ms, 5_000);
        assert_eq!(config.routes.failed.subject, "test.failed");
        assert_eq!(config.routes.completed, SessionRoutes::default().completed);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source: picker-7\ntoken: secret").unwrap();

        let config = ClientConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.source, "picker-7");
        assert_eq!(config.auth_token(), Some("secret"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClientConfig::load_from_file("/nonexistent/swarm-events.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_reconnect_budget_large_max_reconnects() {
        // Truncating 2^32 to u32 would give a zero budget
        let config = ClientConfig {
            max_reconnects: 1 << 32,
            reconnect_wait_ms: 1,
            ..Default::default()
        };
        assert_eq!(config.reconnect_budget(), Duration::from_millis(u32::MAX as u64));
    }

    #[test]
    fn test_reconnect_budget_saturates() {
        let config = ClientConfig {
            max_reconnects: usize::MAX,
            reconnect_wait_ms: u64::MAX,
            ..Default::default()
        };
        assert_eq!(config.reconnect_budget(), Duration::MAX);
    }
}
