use chrono::{DateTime, Utc};

use crate::model::state::AppState;
use crate::model::task::{Quadrant, Task, TaskChanges, normalize_text, text_len};
use crate::ops::events::{Event, Listeners};
use crate::ops::projector::{ProjectedView, project};
use crate::ops::reorder::{ProposedOrder, reconcile};
use crate::util::id::new_id;

/// Why task text was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TextRejected {
    #[error("task text is empty")]
    Empty,
    #[error("task text is {len} characters; the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Owner of the canonical task list.
///
/// Every change to task data goes through one of these methods. Each returns
/// whether anything changed; a rejected or no-op call leaves the state
/// untouched and emits nothing.
#[derive(Debug)]
pub struct TaskStore {
    state: AppState,
    max_text_len: usize,
    listeners: Listeners,
}

impl TaskStore {
    pub fn new(state: AppState, max_text_len: usize) -> Self {
        TaskStore {
            state,
            max_text_len,
            listeners: Listeners::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.state.find(id)
    }

    pub fn last_quadrant(&self) -> Quadrant {
        self.state.last_quadrant
    }

    pub fn max_text_len(&self) -> usize {
        self.max_text_len
    }

    /// Current per-quadrant views
    pub fn project(&self) -> ProjectedView<'_> {
        project(&self.state.tasks)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) {
        self.listeners.subscribe(listener);
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.listeners.emit(&event);
    }

    /// Normalize `text` and check it against the length limit
    pub fn validate_text<'t>(&self, text: &'t str) -> Result<&'t str, TextRejected> {
        let normalized = normalize_text(text);
        let len = text_len(normalized);
        if len == 0 {
            Err(TextRejected::Empty)
        } else if len > self.max_text_len {
            Err(TextRejected::TooLong {
                len,
                max: self.max_text_len,
            })
        } else {
            Ok(normalized)
        }
    }

    /// Append a new task to the end of the list. Returns its id, or None if
    /// the text is empty or too long.
    pub fn add(&mut self, text: &str, quadrant: Quadrant) -> Option<String> {
        let text = self.validate_text(text).ok()?.to_string();
        let id = loop {
            let id = new_id();
            if !self.state.contains(&id) {
                break id;
            }
        };
        self.state
            .tasks
            .push(Task::new(id.clone(), text.clone(), quadrant, Utc::now()));
        self.state.last_quadrant = quadrant;
        self.emit(Event::TaskCreated {
            id: id.clone(),
            text,
            quadrant,
        });
        Some(id)
    }

    /// Merge `changes` into a task and refresh its `updatedAt`.
    ///
    /// Text is trimmed but not length-checked; callers validate first with
    /// `validate_text`.
    pub fn update(&mut self, id: &str, changes: TaskChanges) -> bool {
        let Some(task) = self.state.find_mut(id) else {
            return false;
        };
        if let Some(text) = changes.text {
            task.text = normalize_text(&text).to_string();
        }
        if let Some(quadrant) = changes.quadrant {
            task.quadrant = quadrant.into();
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        task.touch(Utc::now());
        self.emit(Event::TaskUpdated { id: id.to_string() });
        true
    }

    pub fn toggle_completed(&mut self, id: &str) -> bool {
        match self.get(id) {
            Some(task) => {
                let completed = !task.completed;
                self.update(id, TaskChanges::completed(completed))
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.state.position(id) else {
            return false;
        };
        self.state.tasks.remove(pos);
        self.emit(Event::TaskDeleted { id: id.to_string() });
        true
    }

    /// Reassign a task's quadrant. Moving to the current quadrant is a no-op.
    pub fn move_task(&mut self, id: &str, quadrant: Quadrant) -> bool {
        let Some(task) = self.state.find_mut(id) else {
            return false;
        };
        if task.quadrant.is(quadrant) {
            return false;
        }
        let from = std::mem::replace(&mut task.quadrant, quadrant.into());
        task.touch(Utc::now());
        self.emit(Event::TaskMoved {
            id: id.to_string(),
            from,
            to: quadrant,
        });
        true
    }

    /// Apply a proposed visual order. Returns whether order or quadrants changed.
    pub fn reorder(&mut self, proposal: &ProposedOrder) -> bool {
        self.reorder_at(proposal, Utc::now())
    }

    fn reorder_at(&mut self, proposal: &ProposedOrder, now: DateTime<Utc>) -> bool {
        let before: Vec<_> = self
            .state
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.quadrant.clone()))
            .collect();
        let tasks = std::mem::take(&mut self.state.tasks);
        self.state.tasks = reconcile(tasks, proposal, now);

        let changed = self
            .state
            .tasks
            .iter()
            .zip(&before)
            .any(|(t, (id, placement))| t.id != *id || t.quadrant != *placement);
        if !changed {
            return false;
        }

        if let Some(moved) = &proposal.moved
            && let Some((_, from)) = before.iter().find(|(id, _)| *id == moved.id)
            && !from.is(moved.to)
        {
            self.emit(Event::TaskMoved {
                id: moved.id.clone(),
                from: from.clone(),
                to: moved.to,
            });
        }
        self.emit(Event::Reordered);
        true
    }

    /// Record the quadrant picked in an add-task control
    pub fn set_last_quadrant(&mut self, quadrant: Quadrant) -> bool {
        if self.state.last_quadrant == quadrant {
            return false;
        }
        self.state.last_quadrant = quadrant;
        self.emit(Event::LastQuadrantChanged(quadrant));
        true
    }

    /// Remove every task. Returns how many were removed.
    pub fn bulk_clear(&mut self) -> usize {
        let removed = self.state.tasks.len();
        self.state.tasks.clear();
        self.emit(Event::Cleared { removed });
        removed
    }

    /// Record the time of a successful save
    pub fn mark_persisted(&mut self, at: DateTime<Utc>) {
        self.state.updated_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Placement;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    fn store() -> TaskStore {
        TaskStore::new(AppState::default(), 140)
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_add_appends_and_records_quadrant() {
        let mut s = store();
        s.add("First", Quadrant::DoFirst).unwrap();
        let id = s.add("  Buy milk  ", Quadrant::Schedule).unwrap();

        assert_eq!(s.tasks().len(), 2);
        let task = s.tasks().last().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.text, "Buy milk");
        assert!(task.quadrant.is(Quadrant::Schedule));
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(s.last_quadrant(), Quadrant::Schedule);
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let mut s = store();
        assert!(s.add("", Quadrant::DoFirst).is_none());
        assert!(s.add("   ", Quadrant::Schedule).is_none());
        assert!(s.tasks().is_empty());
        assert_eq!(s.last_quadrant(), Quadrant::DoFirst);
    }

    #[test]
    fn test_add_enforces_max_length() {
        let mut s = store();
        assert!(s.add(&"x".repeat(141), Quadrant::DoFirst).is_none());
        assert!(s.tasks().is_empty());

        assert!(s.add(&"x".repeat(140), Quadrant::DoFirst).is_some());
        // Surrounding whitespace doesn't count
        assert!(s.add(&format!("  {}  ", "y".repeat(140)), Quadrant::DoFirst).is_some());
        assert_eq!(s.tasks().len(), 2);
    }

    #[test]
    fn test_validate_text_reports_reason() {
        let s = TaskStore::new(AppState::default(), 5);
        assert_eq!(s.validate_text(" hi "), Ok("hi"));
        assert_eq!(s.validate_text(" \t"), Err(TextRejected::Empty));
        assert_eq!(
            s.validate_text("toolong"),
            Err(TextRejected::TooLong { len: 7, max: 5 })
        );
    }

    #[test]
    fn test_add_emits_task_created() {
        let (tx, rx) = mpsc::channel();
        let mut s = store();
        s.subscribe(move |e| tx.send(e.clone()).unwrap());

        let id = s.add("Call plumber", Quadrant::Delegate).unwrap();
        s.add("", Quadrant::Delegate);

        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![Event::TaskCreated {
                id,
                text: "Call plumber".into(),
                quadrant: Quadrant::Delegate,
            }]
        );
    }

    #[test]
    fn test_update_merges_and_stamps() {
        let mut s = store();
        let id = s.add("Draft", Quadrant::Schedule).unwrap();
        let created = s.get(&id).unwrap().created_at;

        assert!(s.update(
            &id,
            TaskChanges {
                text: Some(" Final ".into()),
                completed: Some(true),
                ..Default::default()
            }
        ));
        let task = s.get(&id).unwrap();
        assert_eq!(task.text, "Final");
        assert!(task.completed);
        assert!(task.quadrant.is(Quadrant::Schedule));
        assert_eq!(task.created_at, created);
        assert!(task.updated_at >= created);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut s = store();
        s.add("Only", Quadrant::DoFirst);
        let before = s.state().clone();
        assert!(!s.update("ghost", TaskChanges::text("x")));
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_update_does_not_check_length() {
        let mut s = TaskStore::new(AppState::default(), 5);
        let id = s.add("short", Quadrant::DoFirst).unwrap();
        assert!(s.update(&id, TaskChanges::text("much longer text")));
        assert_eq!(s.get(&id).unwrap().text, "much longer text");
    }

    #[test]
    fn test_toggle_completed_flips() {
        let mut s = store();
        let id = s.add("Laundry", Quadrant::Eliminate).unwrap();
        assert!(s.toggle_completed(&id));
        assert!(s.get(&id).unwrap().completed);
        assert!(s.toggle_completed(&id));
        assert!(!s.get(&id).unwrap().completed);
        assert!(!s.toggle_completed("ghost"));
    }

    #[test]
    fn test_delete_twice_is_noop_second_time() {
        let mut s = store();
        let id = s.add("Gone soon", Quadrant::DoFirst).unwrap();
        s.add("Stays", Quadrant::DoFirst);

        assert!(s.delete(&id));
        let after_first = s.state().clone();
        assert!(!s.delete(&id));
        assert_eq!(s.state(), &after_first);
        assert_eq!(s.tasks().len(), 1);
    }

    #[test]
    fn test_move_is_idempotent() {
        let mut s = store();
        let id = s.add("Plan trip", Quadrant::DoFirst).unwrap();

        assert!(s.move_task(&id, Quadrant::Schedule));
        let after_first = s.state().clone();
        let stamped = s.get(&id).unwrap().updated_at;

        assert!(!s.move_task(&id, Quadrant::Schedule));
        assert_eq!(s.state(), &after_first);
        assert_eq!(s.get(&id).unwrap().updated_at, stamped);
        assert!(!s.move_task("ghost", Quadrant::Schedule));
    }

    #[test]
    fn test_move_emits_from_and_to() {
        let (tx, rx) = mpsc::channel();
        let mut s = store();
        let id = s.add("Plan trip", Quadrant::DoFirst).unwrap();
        s.subscribe(move |e| tx.send(e.clone()).unwrap());
        s.move_task(&id, Quadrant::Eliminate);
        s.move_task(&id, Quadrant::Eliminate);

        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![Event::TaskMoved {
                id,
                from: Placement::Quadrant(Quadrant::DoFirst),
                to: Quadrant::Eliminate,
            }]
        );
    }

    #[test]
    fn test_reorder_keeps_every_task() {
        let mut s = store();
        let a = s.add("A", Quadrant::DoFirst).unwrap();
        let b = s.add("B", Quadrant::DoFirst).unwrap();
        let c = s.add("C", Quadrant::Schedule).unwrap();

        // Proposal mentions only b and a stale id
        let proposal = ProposedOrder {
            lists: vec![(Quadrant::DoFirst, vec![b.clone(), "stale".into()])],
            moved: None,
        };
        assert!(s.reorder(&proposal));
        let ids: Vec<&str> = s.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![b.as_str(), a.as_str(), c.as_str()]);
    }

    #[test]
    fn test_reorder_without_change_reports_false() {
        let mut s = store();
        s.add("A", Quadrant::DoFirst);
        s.add("B", Quadrant::Schedule);
        let proposal = ProposedOrder::from_view(&s.project());
        assert!(!s.reorder(&proposal));
    }

    #[test]
    fn test_reorder_across_quadrants_emits_move() {
        let (tx, rx) = mpsc::channel();
        let mut s = store();
        let a = s.add("A", Quadrant::DoFirst).unwrap();
        s.add("B", Quadrant::Schedule);
        s.subscribe(move |e| tx.send(e.clone()).unwrap());

        let proposal = ProposedOrder::transfer(&s.project(), &a, Quadrant::Schedule, None).unwrap();
        let now = at("2030-01-01T00:00:00Z");
        assert!(s.reorder_at(&proposal, now));

        assert!(s.get(&a).unwrap().quadrant.is(Quadrant::Schedule));
        assert_eq!(s.get(&a).unwrap().updated_at, now);
        assert_eq!(s.project().lane(Quadrant::Schedule).len(), 2);

        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::TaskMoved { .. }));
        assert_eq!(events[1], Event::Reordered);
    }

    #[test]
    fn test_set_last_quadrant_only_changes_once() {
        let mut s = store();
        assert!(!s.set_last_quadrant(Quadrant::DoFirst));
        assert!(s.set_last_quadrant(Quadrant::Delegate));
        assert!(!s.set_last_quadrant(Quadrant::Delegate));
        assert_eq!(s.last_quadrant(), Quadrant::Delegate);
    }

    #[test]
    fn test_bulk_clear_empties() {
        let mut s = store();
        s.add("A", Quadrant::DoFirst);
        s.add("B", Quadrant::Eliminate);
        assert_eq!(s.bulk_clear(), 2);
        assert!(s.tasks().is_empty());
        assert_eq!(s.bulk_clear(), 0);
    }

    #[test]
    fn test_unrecognized_tasks_survive_mutations() {
        let mut state = AppState::default();
        let mut foreign = Task::new("f".into(), "Foreign".into(), Quadrant::DoFirst, Utc::now());
        foreign.quadrant = Placement::Unrecognized("someday".into());
        state.tasks.push(foreign);
        let mut s = TaskStore::new(state, 140);

        let id = s.add("Visible", Quadrant::DoFirst).unwrap();
        s.move_task(&id, Quadrant::Schedule);
        let proposal = ProposedOrder::from_view(&s.project());
        s.reorder(&proposal);

        assert_eq!(s.tasks().len(), 2);
        assert!(s.get("f").is_some());
        assert_eq!(s.project().visible_count(), 1);
    }
}
