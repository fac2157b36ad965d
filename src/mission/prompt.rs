//! Worker prompt construction.

use std::fmt::Write as _;

use super::briefing::Briefing;

/// Minimal system prompt for a worker: the task and the rules, nothing else
pub fn build_worker_prompt(briefing: &Briefing) -> String {
    let mut sb = String::new();

    sb.push_str(
        "You are a worker agent executing a specific task. Complete it precisely and efficiently.\n\n",
    );
    let _ = write!(sb, "## Task: {}\n\n", briefing.task_id);
    let _ = write!(sb, "**Objective:** {}\n\n", briefing.objective);

    if !briefing.context.is_empty() {
        let _ = write!(sb, "**Context:** {}\n\n", briefing.context);
    }

    push_section(&mut sb, "**Constraints:**", &briefing.constraints, |c| c.to_string());
    push_section(
        &mut sb,
        "**Acceptance Criteria:**",
        &briefing.acceptance_criteria,
        |c| c.to_string(),
    );
    push_section(
        &mut sb,
        "**File Scope** (only modify these files):",
        &briefing.file_scope,
        |f| format!("`{}`", f),
    );
    push_section(
        &mut sb,
        "**Predecessor Findings:**",
        &briefing.predecessor_findings,
        |f| f.to_string(),
    );

    sb.push_str("## Rules\n\n");
    sb.push_str("- Complete the objective using the tools available to you.\n");
    sb.push_str("- Only modify files within the specified scope (if given).\n");
    sb.push_str("- When done, provide a concise summary of what was accomplished.\n");
    sb.push_str("- If you encounter blockers, report them clearly.\n");

    sb
}

fn push_section(sb: &mut String, heading: &str, items: &[String], render: impl Fn(&str) -> String) {
    if items.is_empty() {
        return;
    }
    sb.push_str(heading);
    sb.push('\n');
    for item in items {
        let _ = writeln!(sb, "- {}", render(item.as_str()));
    }
    sb.push('\n');
}

/// First user message of the worker loop
pub fn build_task_message(briefing: &Briefing) -> String {
    format!("Execute task {}: {}", briefing.task_id, briefing.objective)
}
