use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Quadrant, Task};

/// Current schema version of the persisted document
pub const SCHEMA_VERSION: u32 = 1;

/// The whole application state, persisted as one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub version: u32,
    /// Time of the last successful save
    pub updated_at: Option<DateTime<Utc>>,
    /// Canonical task order
    pub tasks: Vec<Task>,
    /// Last quadrant picked for a new task
    pub last_quadrant: Quadrant,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            version: SCHEMA_VERSION,
            updated_at: None,
            tasks: Vec::new(),
            last_quadrant: Quadrant::DoFirst,
        }
    }
}

impl AppState {
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty_and_current() {
        let state = AppState::default();
        assert_eq!(state.version, SCHEMA_VERSION);
        assert!(state.tasks.is_empty());
        assert_eq!(state.last_quadrant, Quadrant::DoFirst);
        assert!(state.updated_at.is_none());
    }

    #[test]
    fn test_serializes_with_persisted_field_names() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(json["version"], 1);
        assert!(json["updatedAt"].is_null());
        assert_eq!(json["lastQuadrant"], "do_first");
        assert!(json["tasks"].as_array().unwrap().is_empty());
    }
}
