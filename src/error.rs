//! Error types for connecting, publishing, configuration and mission files.
//!
//! Each fault domain keeps its own enum so callers can tell a broker that was
//! never reachable apart from a payload that could not be encoded or a publish
//! that timed out.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Failure to establish or keep the broker connection
#[derive(Debug)]
pub enum ConnectError {
    /// The configuration cannot be used to connect (e.g. empty URL)
    InvalidConfig(String),
    /// The NATS handshake failed
    Handshake(async_nats::ConnectError),
    /// The handshake did not finish within the configured bound
    HandshakeTimeout(Duration),
    /// The connection was lost and the reconnect budget is spent
    ReconnectsExhausted { max_reconnects: usize },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::InvalidConfig(msg) => write!(f, "Invalid connection config: {}", msg),
            ConnectError::Handshake(e) => write!(f, "NATS connect failed: {}", e),
            ConnectError::HandshakeTimeout(d) => {
                write!(f, "NATS connect timed out after {}ms", d.as_millis())
            }
            ConnectError::ReconnectsExhausted { max_reconnects } => {
                write!(f, "NATS connection lost after {} reconnect attempts", max_reconnects)
            }
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::Handshake(e) => Some(e),
            _ => None,
        }
    }
}

/// Encoding failure for either the payload or the envelope around it
#[derive(Debug)]
pub enum SerializationError {
    Payload(serde_json::Error),
    Envelope(serde_json::Error),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::Payload(e) => write!(f, "Failed to serialize payload: {}", e),
            SerializationError::Envelope(e) => write!(f, "Failed to serialize envelope: {}", e),
        }
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializationError::Payload(e) | SerializationError::Envelope(e) => Some(e),
        }
    }
}

/// Failure to get a durable acknowledgment for a published message
#[derive(Debug)]
pub enum PublishError {
    /// No ack arrived before the publish deadline
    Timeout(Duration),
    /// The broker rejected the message or the transport failed
    Broker(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Timeout(d) => {
                write!(f, "No JetStream ack within {}ms", d.as_millis())
            }
            PublishError::Broker(e) => write!(f, "JetStream publish failed: {}", e),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Broker(e) => Some(&**e),
            PublishError::Timeout(_) => None,
        }
    }
}

/// Any error surfaced by the publishing client
#[derive(Debug)]
pub enum ClientError {
    Connect(ConnectError),
    Serialization(SerializationError),
    Publish(PublishError),
}

impl From<ConnectError> for ClientError {
    fn from(err: ConnectError) -> Self {
        ClientError::Connect(err)
    }
}

impl From<SerializationError> for ClientError {
    fn from(err: SerializationError) -> Self {
        ClientError::Serialization(err)
    }
}

impl From<PublishError> for ClientError {
    fn from(err: PublishError) -> Self {
        ClientError::Publish(err)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Connect(e) => write!(f, "{}", e),
            ClientError::Serialization(e) => write!(f, "{}", e),
            ClientError::Publish(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Connect(e) => Some(e),
            ClientError::Serialization(e) => Some(e),
            ClientError::Publish(e) => Some(e),
        }
    }
}

/// Error loading a client configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Yaml(serde_yaml::Error),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config file {}: {}", path.display(), source)
            }
            ConfigError::Yaml(e) => write!(f, "Failed to parse YAML: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Yaml(e) => Some(e),
        }
    }
}

/// Error reading a briefing or writing findings
#[derive(Debug)]
pub enum MissionError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl From<serde_json::Error> for MissionError {
    fn from(err: serde_json::Error) -> Self {
        MissionError::Json(err)
    }
}

impl fmt::Display for MissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            MissionError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for MissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MissionError::Io { source, .. } => Some(source),
            MissionError::Json(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_client_error_keeps_fault_domain() {
        let err: ClientError = PublishError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, ClientError::Publish(PublishError::Timeout(_))));
        assert_eq!(err.to_string(), "No JetStream ack within 5000ms");

        let err: ClientError = ConnectError::ReconnectsExhausted { max_reconnects: 3 }.into();
        assert!(matches!(err, ClientError::Connect(_)));
    }

    #[test]
    fn test_serialization_error_exposes_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SerializationError::Payload(cause);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to serialize payload"));
    }

    #[test]
    fn test_broker_error_from_message() {
        let err = PublishError::Broker("no responders".into());
        assert_eq!(err.to_string(), "JetStream publish failed: no responders");
    }
}
