//! Findings report written by a worker when its task ends.
//!
//! The report is markdown with the structured fields as JSON frontmatter, so
//! the orchestrator can parse it and a human can read it.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::MISSION_DIR;
use crate::error::MissionError;

/// Output report from a completed worker task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub task_id: String,
    pub summary: String,
    #[serde(default)]
    pub files_changed: Vec<String>,
    #[serde(default)]
    pub tests_run: bool,
    #[serde(default)]
    pub tests_passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

/// `{mission_dir}/.mission/findings/{task_id}.md`
pub fn findings_path(mission_dir: impl AsRef<Path>, task_id: &str) -> PathBuf {
    mission_dir
        .as_ref()
        .join(MISSION_DIR)
        .join("findings")
        .join(format!("{}.md", task_id))
}

/// Render findings as markdown with JSON frontmatter
pub fn render_findings(findings: &Findings) -> Result<String, MissionError> {
    let frontmatter = serde_json::to_string_pretty(findings)?;

    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&frontmatter);
    md.push_str("\n---\n\n");
    let _ = write!(md, "# Findings: {}\n\n", findings.task_id);
    let _ = write!(md, "## Summary\n\n{}\n\n", findings.summary);

    if !findings.files_changed.is_empty() {
        md.push_str("## Files Changed\n\n");
        for file in &findings.files_changed {
            let _ = writeln!(md, "- `{}`", file);
        }
        md.push('\n');
    }

    if findings.tests_run {
        let status = if findings.tests_passed { "PASSED" } else { "FAILED" };
        let _ = write!(md, "## Tests\n\nTests were run: **{}**\n\n", status);
    }

    push_list(&mut md, "Issues", &findings.issues);
    push_list(&mut md, "Next Steps", &findings.next_steps);

    Ok(md)
}

fn push_list(md: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(md, "## {}\n\n", heading);
    for item in items {
        let _ = writeln!(md, "- {}", item);
    }
    md.push('\n');
}

/// Write findings to [`findings_path`], creating the directory if needed
pub fn write_findings(mission_dir: impl AsRef<Path>, findings: &Findings) -> Result<PathBuf, MissionError> {
    let path = findings_path(mission_dir, &findings.task_id);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| MissionError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let md = render_findings(findings)?;
    fs::write(&path, md).map_err(|source| MissionError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Wrote findings for {} to {}", findings.task_id, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_minimal() {
        let findings = Findings {
            task_id: "t-1".to_string(),
            summary: "Nothing to do".to_string(),
            ..Default::default()
        };

        let md = render_findings(&findings).unwrap();
        assert!(md.starts_with("---\n{\n  \"task_id\": \"t-1\""));
        assert!(md.contains("# Findings: t-1\n\n## Summary\n\nNothing to do\n\n"));
        assert!(!md.contains("## Files Changed"));
        assert!(!md.contains("## Tests"));
        assert!(!md.contains("\"issues\""));
    }

    #[test]
    fn test_render_failed_tests() {
        let findings = Findings {
            task_id: "t-2".to_string(),
            summary: "Partial".to_string(),
            tests_run: true,
            tests_passed: false,
            issues: vec!["flaky network test".to_string()],
            ..Default::default()
        };

        let md = render_findings(&findings).unwrap();
        assert!(md.contains("Tests were run: **FAILED**"));
        assert!(md.contains("## Issues\n\n- flaky network test\n"));
    }
}
