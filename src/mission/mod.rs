//! Mission handoff files shared between the orchestrator and a worker.
//!
//! The orchestrator drops a briefing under `.mission/handoffs/`, the worker
//! turns it into a prompt, does the work, and leaves its findings under
//! `.mission/findings/`.

pub mod briefing;
pub mod findings;
pub mod prompt;

pub use briefing::{briefing_path, read_briefing, Briefing};
pub use findings::{findings_path, render_findings, write_findings, Findings};
pub use prompt::{build_task_message, build_worker_prompt};

pub(crate) const MISSION_DIR: &str = ".mission";
