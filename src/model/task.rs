use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the four fixed priority categories of the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Urgent and important
    DoFirst,
    /// Important, not urgent
    Schedule,
    /// Urgent, not important
    Delegate,
    /// Neither
    Eliminate,
}

impl Quadrant {
    /// All quadrants in display order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DoFirst,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    /// The persisted key (`do_first`, `schedule`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Quadrant::DoFirst => "do_first",
            Quadrant::Schedule => "schedule",
            Quadrant::Delegate => "delegate",
            Quadrant::Eliminate => "eliminate",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::DoFirst => "Do First",
            Quadrant::Schedule => "Schedule",
            Quadrant::Delegate => "Delegate",
            Quadrant::Eliminate => "Eliminate",
        }
    }

    /// Position in `ALL` (0-based)
    pub fn index(self) -> usize {
        match self {
            Quadrant::DoFirst => 0,
            Quadrant::Schedule => 1,
            Quadrant::Delegate => 2,
            Quadrant::Eliminate => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Quadrant> {
        Quadrant::ALL.get(index).copied()
    }

    /// Parse an exact persisted key. Storage only accepts this form.
    pub fn from_key(s: &str) -> Option<Quadrant> {
        Quadrant::ALL.into_iter().find(|q| q.key() == s)
    }

    /// Next quadrant in display order, wrapping around
    pub fn next(self) -> Quadrant {
        Quadrant::ALL[(self.index() + 1) % 4]
    }

    /// Previous quadrant in display order, wrapping around
    pub fn prev(self) -> Quadrant {
        Quadrant::ALL[(self.index() + 3) % 4]
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quadrant '{0}' (expected do_first, schedule, delegate, eliminate or 1-4)")]
pub struct QuadrantParseError(pub String);

/// Lenient parsing for user input: keys, dashed keys, labels and 1-4.
impl FromStr for Quadrant {
    type Err = QuadrantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        if let Some(q) = Quadrant::from_key(&norm) {
            return Ok(q);
        }
        match norm.as_str() {
            "1" => Ok(Quadrant::DoFirst),
            "2" => Ok(Quadrant::Schedule),
            "3" => Ok(Quadrant::Delegate),
            "4" => Ok(Quadrant::Eliminate),
            "do" | "first" => Ok(Quadrant::DoFirst),
            _ => Err(QuadrantParseError(s.to_string())),
        }
    }
}

/// The quadrant field of a stored task.
///
/// Documents written by other versions of the app may carry a quadrant this
/// build doesn't know. Those tasks are kept (and written back verbatim) but
/// never shown in any view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Placement {
    Quadrant(Quadrant),
    Unrecognized(String),
}

impl Placement {
    pub fn quadrant(&self) -> Option<Quadrant> {
        match self {
            Placement::Quadrant(q) => Some(*q),
            Placement::Unrecognized(_) => None,
        }
    }

    pub fn is(&self, quadrant: Quadrant) -> bool {
        self.quadrant() == Some(quadrant)
    }
}

impl From<Quadrant> for Placement {
    fn from(q: Quadrant) -> Self {
        Placement::Quadrant(q)
    }
}

impl From<String> for Placement {
    fn from(s: String) -> Self {
        match Quadrant::from_key(&s) {
            Some(q) => Placement::Quadrant(q),
            None => Placement::Unrecognized(s),
        }
    }
}

impl From<Placement> for String {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Quadrant(q) => q.key().to_string(),
            Placement::Unrecognized(s) => s,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Quadrant(q) => write!(f, "{}", q),
            Placement::Unrecognized(s) => write!(f, "{}", s),
        }
    }
}

/// A single task in the matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique ID, immutable after creation
    pub id: String,
    /// Trimmed, non-empty text
    pub text: String,
    pub quadrant: Placement,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new, not yet completed task stamped with `now`
    pub fn new(id: String, text: String, quadrant: Quadrant, now: DateTime<Utc>) -> Self {
        Task {
            id,
            text,
            quadrant: Placement::Quadrant(quadrant),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Field changes merged into a task by `TaskStore::update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub text: Option<String>,
    pub quadrant: Option<Quadrant>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn text(text: impl Into<String>) -> Self {
        TaskChanges {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        TaskChanges {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.quadrant.is_none() && self.completed.is_none()
    }
}

/// Normalize user-entered task text
pub fn normalize_text(text: &str) -> &str {
    text.trim()
}

/// Length of task text as counted against the configured maximum
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_keys_round_trip() {
        for q in Quadrant::ALL {
            assert_eq!(Quadrant::from_key(q.key()), Some(q));
            assert_eq!(Quadrant::from_index(q.index()), Some(q));
        }
        assert_eq!(Quadrant::from_key("Do First"), None);
    }

    #[test]
    fn test_quadrant_from_str_is_lenient() {
        assert_eq!("do-first".parse::<Quadrant>(), Ok(Quadrant::DoFirst));
        assert_eq!("Schedule".parse::<Quadrant>(), Ok(Quadrant::Schedule));
        assert_eq!("3".parse::<Quadrant>(), Ok(Quadrant::Delegate));
        assert_eq!(" eliminate ".parse::<Quadrant>(), Ok(Quadrant::Eliminate));
        assert!("urgent".parse::<Quadrant>().is_err());
    }

    #[test]
    fn test_next_and_prev_wrap() {
        assert_eq!(Quadrant::Eliminate.next(), Quadrant::DoFirst);
        assert_eq!(Quadrant::DoFirst.prev(), Quadrant::Eliminate);
        assert_eq!(Quadrant::Schedule.next(), Quadrant::Delegate);
    }

    #[test]
    fn test_placement_keeps_foreign_values() {
        let p: Placement = serde_json::from_str("\"someday\"").unwrap();
        assert_eq!(p, Placement::Unrecognized("someday".into()));
        assert_eq!(p.quadrant(), None);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"someday\"");

        let p: Placement = serde_json::from_str("\"delegate\"").unwrap();
        assert!(p.is(Quadrant::Delegate));
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let now = DateTime::parse_from_rfc3339("2025-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let task = Task::new("a1".into(), "Write report".into(), Quadrant::Schedule, now);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["quadrant"], "schedule");
        assert_eq!(json["completed"], false);
        assert_eq!(json["createdAt"], "2025-05-01T10:00:00Z");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_text_len_counts_chars() {
        assert_eq!(text_len("héllo"), 5);
        assert_eq!(normalize_text("  hi  "), "hi");
    }
}
