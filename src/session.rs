//! Outcome payload for `cc.session.completed` / `cc.session.failed` events.
//!
//! The field layout is shared with other producers on the same stream, so
//! optional strings and token counters are left out of the JSON entirely
//! when empty or zero instead of being sent as `""` or `0`.

use serde::{Deserialize, Serialize};

use crate::usage::TokenUsage;

/// Result of one worker session, sent as the envelope `data`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub task_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_uuid: String,

    pub agent_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transcript_path: String,

    #[serde(default)]
    pub files_changed: Vec<String>,

    #[serde(default)]
    pub exit_code: i32,

    #[serde(default)]
    pub duration_ms: i64,

    #[serde(default)]
    pub working_dir: String,

    #[serde(default)]
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub runtime: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub input_tokens: u64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub output_tokens: u64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_read_tokens: u64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_write_tokens: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl SessionData {
    /// Create a payload with the required identity fields; everything else starts empty
    pub fn new(
        session_id: impl Into<String>,
        agent_type: impl Into<String>,
        working_dir: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            agent_type: agent_type.into(),
            working_dir: working_dir.into(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ..Default::default()
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    pub fn with_files_changed(mut self, files: Vec<String>) -> Self {
        self.files_changed = files;
        self
    }

    pub fn with_exit(mut self, exit_code: i32, duration_ms: i64) -> Self {
        self.exit_code = exit_code;
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>, runtime: impl Into<String>) -> Self {
        self.model = model.into();
        self.runtime = runtime.into();
        self
    }

    /// Copy accumulated token counters into the payload
    pub fn with_usage(mut self, usage: &TokenUsage) -> Self {
        self.input_tokens = usage.prompt_tokens;
        self.output_tokens = usage.completion_tokens;
        self.cache_read_tokens = usage.cache_read_tokens;
        self.cache_write_tokens = usage.cache_write_tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn to_map(data: &SessionData) -> serde_json::Map<String, Value> {
        match serde_json::to_value(data).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn full_session() -> SessionData {
        SessionData {
            session_id: "worker-test-1".to_string(),
            task_id: "task-42".to_string(),
            agent_type: "worker".to_string(),
            files_changed: vec!["main.rs".to_string(), "config.rs".to_string()],
            exit_code: 0,
            duration_ms: 12345,
            working_dir: "/tmp/test".to_string(),
            timestamp: "2026-02-16T00:00:00Z".to_string(),
            model: "anthropic/claude-sonnet-4".to_string(),
            runtime: "worker-dev".to_string(),
            input_tokens: 1000,
            output_tokens: 500,
            cache_read_tokens: 200,
            cache_write_tokens: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_session_fields() {
        let m = to_map(&full_session());

        assert_eq!(m["session_id"], "worker-test-1");
        assert_eq!(m["agent_type"], "worker");
        assert_eq!(m["task_id"], "task-42");
        assert_eq!(m["model"], "anthropic/claude-sonnet-4");
        assert_eq!(m["runtime"], "worker-dev");
        assert_eq!(m["input_tokens"], 1000);
        assert_eq!(m["output_tokens"], 500);
        assert_eq!(m["cache_read_tokens"], 200);
        assert_eq!(m["cache_write_tokens"], 100);
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let data = full_session();
        let raw = serde_json::to_string(&data).unwrap();
        let back: SessionData = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_minimal_session_omits_optional_keys() {
        let data = SessionData {
            session_id: "s1".to_string(),
            agent_type: "x".to_string(),
            files_changed: vec![],
            exit_code: 0,
            duration_ms: 12345,
            working_dir: "/tmp".to_string(),
            timestamp: "2026-02-16T00:00:00Z".to_string(),
            ..Default::default()
        };

        let m = to_map(&data);
        for key in [
            "task_id",
            "owner_uuid",
            "transcript_path",
            "model",
            "runtime",
            "input_tokens",
            "output_tokens",
            "cache_read_tokens",
            "cache_write_tokens",
        ] {
            assert!(!m.contains_key(key), "expected {} to be omitted", key);
        }

        // Required fields stay, even when zero or empty
        assert_eq!(m["exit_code"], 0);
        assert_eq!(m["files_changed"], Value::Array(vec![]));
        assert_eq!(m["duration_ms"], 12345);
    }

    #[test]
    fn test_partial_tokens_omit_cache_fields() {
        let data = SessionData::new("s2", "worker", "/tmp").with_usage(&TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 500,
            total_tokens: 1500,
            ..Default::default()
        });

        let raw = serde_json::to_string(&data).unwrap();
        let m: serde_json::Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(m["input_tokens"].as_u64(), Some(1000));
        assert_eq!(m["output_tokens"].as_u64(), Some(500));
        assert!(!m.contains_key("cache_read_tokens"));
        assert!(!m.contains_key("cache_write_tokens"));

        let back: SessionData = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.input_tokens, 1000);
        assert_eq!(back.output_tokens, 500);
        assert_eq!(back.cache_read_tokens, 0);
    }

    #[test]
    fn test_builder_sets_timestamp() {
        let data = SessionData::new("s3", "worker", "/work")
            .with_task_id("t-9")
            .with_exit(1, 42);

        assert!(chrono::DateTime::parse_from_rfc3339(&data.timestamp).is_ok());
        assert_eq!(data.task_id, "t-9");
        assert_eq!(data.exit_code, 1);
        assert_eq!(data.duration_ms, 42);
    }
}
