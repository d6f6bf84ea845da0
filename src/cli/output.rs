use indexmap::IndexMap;
use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::task::{Quadrant, Task};
use crate::ops::projector::ProjectedView;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub quadrant: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// `list --json`: lanes keyed by quadrant, in display order
pub type MatrixJson = IndexMap<&'static str, Vec<TaskJson>>;

#[derive(Serialize)]
pub struct ClearedJson {
    pub cleared: usize,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        text: task.text.clone(),
        quadrant: task.quadrant.to_string(),
        completed: task.completed,
        created_at: task.created_at.to_rfc3339(),
        updated_at: task.updated_at.to_rfc3339(),
    }
}

pub fn matrix_to_json(view: &ProjectedView<'_>, only: Option<Quadrant>) -> MatrixJson {
    view.iter()
        .filter(|(q, _)| only.is_none_or(|o| o == *q))
        .map(|(q, tasks)| (q.key(), tasks.iter().map(|t| task_to_json(t)).collect()))
        .collect()
}

pub fn recovery_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `[x] mgx1k2ab-7fq2zc Call the bank`
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    format!("[{}] {} {}", mark, task.id, task.text)
}

/// One quadrant as a heading followed by its tasks, indented
pub fn format_lane(quadrant: Quadrant, tasks: &[&Task]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({})",
        quadrant.index() + 1,
        quadrant.label(),
        tasks.len()
    )];
    if tasks.is_empty() {
        lines.push("  (none)".to_string());
    }
    for task in tasks {
        lines.push(format!("  {}", format_task_line(task)));
    }
    lines
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  {}: {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    lines.extend(entry.body.lines().map(|l| format!("    {}", l)));
    lines
}
