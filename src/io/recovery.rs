use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- eisen recovery log: append-only
     Task data that could not be saved or loaded normally ends up here.
     View with: eisen recovery
     Safe to delete once you have what you need. -->

---
";

/// Why an entry was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Stored document could not be read back; it was set aside
    Corrupt,
    /// Individual task entries were dropped during load
    Dropped,
    /// A save was rejected by storage
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Corrupt => write!(f, "corrupt"),
            RecoveryCategory::Dropped => write!(f, "dropped"),
            RecoveryCategory::Write => write!(f, "write"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "corrupt" => Some(RecoveryCategory::Corrupt),
            "dropped" => Some(RecoveryCategory::Dropped),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>, body: String) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            body,
        }
    }

    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} | {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );
        if !self.body.is_empty() {
            let fence = fence_for(&self.body);
            out.push_str(&format!("\n{}json\n", fence));
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&fence);
            out.push('\n');
        }
        out.push_str("\n---\n");
        out
    }
}

/// A backtick fence longer than any backtick run in `body`, at least three long
fn fence_for(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append an entry to the log. Failures are logged and otherwise ignored.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(data_dir, &entry) {
        tracing::warn!(error = %e, category = %entry.category, "could not write to recovery log");
    }
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);
    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Read all entries from the log, oldest first. A missing log reads as empty.
pub fn read_recovery_entries(data_dir: &Path) -> Vec<RecoveryEntry> {
    match std::fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(content) => parse_entries(&content),
        Err(_) => Vec::new(),
    }
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut current: Option<RecoveryEntry> = None;
    // The fence that opened the body being read, if any
    let mut fence: Option<&str> = None;

    for line in content.lines() {
        if let Some(open) = fence {
            if line == open {
                fence = None;
            } else if let Some(entry) = current.as_mut() {
                entry.body.push_str(line);
                entry.body.push('\n');
            }
            continue;
        }
        if let Some(header) = line.strip_prefix("## ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = parse_header(header);
        } else if line.starts_with("```") && current.is_some() {
            let ticks = line.len() - line.trim_start_matches('`').len();
            fence = Some(&line[..ticks]);
        }
    }
    if let Some(entry) = current {
        entries.push(entry);
    }
    entries
}

fn parse_header(header: &str) -> Option<RecoveryEntry> {
    let (ts, rest) = header.split_once(" | ")?;
    let (category, description) = rest.split_once(": ")?;
    Some(RecoveryEntry {
        timestamp: DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc),
        category: RecoveryCategory::parse_category(category)?,
        description: description.to_string(),
        body: String::new(),
    })
}
