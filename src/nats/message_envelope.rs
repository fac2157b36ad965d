/// Message envelope for NATS JetStream
///
/// Wraps an already-serialized event payload with the id, type, source and
/// timestamp that every consumer of the swarm event stream expects.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Source of fresh envelope ids
///
/// Consumers deduplicate on the envelope id, so production generators must
/// never repeat. Tests can plug in a closure for deterministic ids.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random UUIDv4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique message ID for deduplication
    pub id: String,

    /// Dotted event type, e.g. `cc.session.completed`
    #[serde(rename = "type")]
    pub event_type: String,

    /// Producing component
    pub source: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// Event payload, embedded as-is
    pub data: Box<RawValue>,
}

impl Envelope {
    /// Create an envelope with a random UUIDv4 id
    pub fn new(event_type: &str, source: &str, data: Box<RawValue>) -> Self {
        Self::build(event_type, source, data, &UuidGenerator)
    }

    /// Create an envelope drawing its id from `ids`
    pub fn build(
        event_type: &str,
        source: &str,
        data: Box<RawValue>,
        ids: &dyn IdGenerator,
    ) -> Self {
        Self {
            id: ids.generate(),
            event_type: event_type.to_string(),
            source: source.to_string(),
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn raw(value: Value) -> Box<RawValue> {
        serde_json::value::to_raw_value(&value).unwrap()
    }

    #[test]
    fn test_envelope_wire_format() {
        let fixed = || "test-id".to_string();
        let envelope = Envelope::build(
            "cc.session.completed",
            "swarm-worker",
            raw(json!({"session_id": "test-session", "agent_type": "worker"})),
            &fixed,
        );

        let m: Value = serde_json::from_slice(&envelope.to_vec().unwrap()).unwrap();

        assert_eq!(m["id"], "test-id");
        assert_eq!(m["type"], "cc.session.completed");
        assert_eq!(m["source"], "swarm-worker");
        // data is nested JSON, not a string
        assert_eq!(m["data"]["session_id"], "test-session");
        assert_eq!(m.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let envelope = Envelope::new("t", "s", raw(json!({})));
        let m: Value = serde_json::from_slice(&envelope.to_vec().unwrap()).unwrap();

        let ts = m["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        let parsed = DateTime::parse_from_rfc3339(ts).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), envelope.timestamp);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let envelope = Envelope::new("t", "s", raw(json!(null)));
            assert!(seen.insert(envelope.id));
        }
    }

    #[test]
    fn test_data_is_kept_verbatim() {
        let data = RawValue::from_string(r#"{"b":1,"a":[true,null]}"#.to_string()).unwrap();
        let envelope = Envelope::new("t", "s", data);

        let encoded = String::from_utf8(envelope.to_vec().unwrap()).unwrap();
        assert!(encoded.contains(r#""data":{"b":1,"a":[true,null]}"#));

        let decoded: Envelope = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.data.get(), r#"{"b":1,"a":[true,null]}"#);
    }
}
