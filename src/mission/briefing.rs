//! Task briefing read by a worker at startup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::MISSION_DIR;
use crate::error::MissionError;

/// Input specification for a worker task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    #[serde(default)]
    pub task_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mission_id: String,

    pub objective: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessor_findings: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_scope: Vec<String>,
}

/// `{mission_dir}/.mission/handoffs/{task_id}-briefing.json`
pub fn briefing_path(mission_dir: impl AsRef<Path>, task_id: &str) -> PathBuf {
    mission_dir
        .as_ref()
        .join(MISSION_DIR)
        .join("handoffs")
        .join(format!("{}-briefing.json", task_id))
}

/// Load the briefing for `task_id`.
///
/// A briefing without its own `task_id` takes the one it was looked up by.
pub fn read_briefing(mission_dir: impl AsRef<Path>, task_id: &str) -> Result<Briefing, MissionError> {
    let path = briefing_path(mission_dir, task_id);
    let contents = fs::read_to_string(&path).map_err(|source| MissionError::Io {
        path: path.clone(),
        source,
    })?;

    let mut briefing: Briefing = serde_json::from_str(&contents)?;
    if briefing.task_id.is_empty() {
        briefing.task_id = task_id.to_string();
    }

    Ok(briefing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_briefing_path() {
        let path = briefing_path("/work", "t-1");
        assert_eq!(path, PathBuf::from("/work/.mission/handoffs/t-1-briefing.json"));
    }

    #[test]
    fn test_missing_briefing_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_briefing(dir.path(), "absent").unwrap_err();

        match err {
            MissionError::Io { path, .. } => assert!(path.ends_with("absent-briefing.json")),
            other => panic!("expected Io error, got {}", other),
        }
    }
}
