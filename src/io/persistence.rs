//! Reading and writing the whole application state as one JSON document.
//!
//! Loading never fails: an absent, unreadable or structurally invalid
//! document yields the empty default state. Documents written by older
//! versions are migrated here and nowhere else.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::storage::{Storage, StorageError};
use crate::model::state::{AppState, SCHEMA_VERSION};
use crate::model::task::{Placement, Quadrant, Task, normalize_text};
use crate::util::id::new_id;

/// Why a stored document was rejected as a whole
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("`tasks` is missing or not a list")]
    TasksNotAList,
}

/// Result of decoding a stored document
#[derive(Debug)]
pub struct Decoded {
    pub state: AppState,
    /// Task entries that could not be turned into tasks
    pub dropped: Vec<Value>,
}

/// Borrowed view of `AppState` as it is written to storage
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateDocument<'a> {
    version: u32,
    updated_at: Option<DateTime<Utc>>,
    tasks: &'a [Task],
    last_quadrant: Quadrant,
}

/// Serialize `state` as it would be stored at `saved_at`
pub fn encode_state(state: &AppState, saved_at: DateTime<Utc>) -> Result<String, StorageError> {
    let doc = StateDocument {
        version: SCHEMA_VERSION,
        updated_at: Some(saved_at),
        tasks: &state.tasks,
        last_quadrant: state.last_quadrant,
    };
    serde_json::to_string(&doc).map_err(|e| StorageError::Unavailable(e.to_string()))
}

/// Parse and migrate a stored document.
///
/// Unknown fields are dropped, `completed` is defaulted or coerced to a
/// boolean, and a missing `lastQuadrant` falls back to do_first. Entries
/// without a usable id or text are returned in `dropped`; a repeated id is
/// replaced by a fresh one.
pub fn decode_state(raw: &str, now: DateTime<Utc>) -> Result<Decoded, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let obj = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let entries = obj
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or(DecodeError::TasksNotAList)?;

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(entries.len());
    let mut dropped = Vec::new();
    for entry in entries {
        match migrate_task(entry, now) {
            Some(mut task) => {
                if !seen.insert(task.id.clone()) {
                    let fresh = new_id();
                    tracing::warn!(old = %task.id, new = %fresh, "duplicate task id in stored document");
                    task.id = fresh.clone();
                    seen.insert(fresh);
                }
                tasks.push(task);
            }
            None => dropped.push(entry.clone()),
        }
    }

    let last_quadrant = obj
        .get("lastQuadrant")
        .and_then(Value::as_str)
        .and_then(Quadrant::from_key)
        .unwrap_or(Quadrant::DoFirst);

    Ok(Decoded {
        state: AppState {
            version: SCHEMA_VERSION,
            updated_at: obj.get("updatedAt").and_then(parse_time),
            tasks,
            last_quadrant,
        },
        dropped,
    })
}

fn migrate_task(value: &Value, now: DateTime<Utc>) -> Option<Task> {
    let obj = value.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = normalize_text(obj.get("text")?.as_str()?);
    if id.is_empty() || text.is_empty() {
        return None;
    }

    let created_at = obj.get("createdAt").and_then(parse_time).unwrap_or(now);
    Some(Task {
        id,
        text: text.to_string(),
        quadrant: placement(obj),
        completed: obj.get("completed").is_some_and(truthy),
        created_at,
        updated_at: obj
            .get("updatedAt")
            .and_then(parse_time)
            .unwrap_or(created_at),
    })
}

fn placement(obj: &Map<String, Value>) -> Placement {
    match obj.get("quadrant") {
        Some(Value::String(s)) => Placement::from(s.clone()),
        Some(other) => Placement::Unrecognized(other.to_string()),
        None => Placement::Unrecognized(String::new()),
    }
}

/// Loose boolean coercion for fields written by hand or by older builds
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// RFC 3339 strings or epoch milliseconds
fn parse_time(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}

/// Loads and saves `AppState` under a fixed key of a `Storage`
#[derive(Debug)]
pub struct Gateway<S> {
    storage: S,
    key: String,
    recovery_dir: Option<PathBuf>,
}

impl<S: Storage> Gateway<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Gateway {
            storage,
            key: key.into(),
            recovery_dir: None,
        }
    }

    /// Copy rejected documents and failed saves into the recovery log in `dir`
    pub fn with_recovery_log(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recovery_dir = Some(dir.into());
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the full state. Returns the time recorded as `updatedAt`.
    pub fn save(&mut self, state: &AppState) -> Result<DateTime<Utc>, StorageError> {
        let saved_at = Utc::now();
        let payload = encode_state(state, saved_at)?;
        match self.storage.write(&self.key, &payload) {
            Ok(()) => {
                tracing::debug!(tasks = state.tasks.len(), "saved state");
                Ok(saved_at)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save state");
                self.recover(RecoveryCategory::Write, format!("save failed: {}", e), payload);
                Err(e)
            }
        }
    }

    /// Read the stored state, falling back to the empty default.
    pub fn load(&self) -> AppState {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return AppState::default(),
            Err(StorageError::NotText(lossy)) => {
                tracing::warn!("stored state is not valid UTF-8; starting empty");
                self.recover(
                    RecoveryCategory::Corrupt,
                    "stored document is not valid UTF-8".to_string(),
                    lossy,
                );
                return AppState::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored state; starting empty");
                return AppState::default();
            }
        };

        match decode_state(&raw, Utc::now()) {
            Ok(decoded) => {
                if !decoded.dropped.is_empty() {
                    tracing::warn!(count = decoded.dropped.len(), "dropped invalid task entries");
                    let body = serde_json::to_string_pretty(&decoded.dropped).unwrap_or_default();
                    self.recover(
                        RecoveryCategory::Dropped,
                        format!("{} task entries without id or text", decoded.dropped.len()),
                        body,
                    );
                }
                tracing::info!(tasks = decoded.state.tasks.len(), "loaded state");
                decoded.state
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored state is unreadable; starting empty");
                self.recover(RecoveryCategory::Corrupt, e.to_string(), raw);
                AppState::default()
            }
        }
    }

    fn recover(&self, category: RecoveryCategory, description: String, body: String) {
        if let Some(dir) = &self.recovery_dir {
            log_recovery(dir, RecoveryEntry::new(category, description, body));
        }
    }
}
