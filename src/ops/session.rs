//! The single-threaded controller front ends drive.
//!
//! A `Session` owns the task store, the persistence gateway and the save
//! scheduler. Mutators forward to the store and arm a debounced save when
//! something actually changed; the caller's loop calls `tick` to run the save
//! once it is due, and `flush_pending` before exiting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::io::persistence::Gateway;
use crate::io::storage::{Storage, StorageError};
use crate::model::config::Config;
use crate::model::task::{Quadrant, TaskChanges};
use crate::ops::events::Event;
use crate::ops::projector::ProjectedView;
use crate::ops::reorder::ProposedOrder;
use crate::ops::scheduler::SaveScheduler;
use crate::ops::store::{TaskStore, TextRejected};

/// Asks the user before a destructive action
pub trait ConfirmGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmGate for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub const CLEAR_PROMPT: &str = "Clear all tasks? This cannot be undone.";

#[derive(Debug)]
pub struct Session<S> {
    store: TaskStore,
    gateway: Gateway<S>,
    scheduler: SaveScheduler,
    last_error: Option<StorageError>,
    /// Set by every change, cleared only by a save that succeeded
    dirty: bool,
}

impl<S: Storage> Session<S> {
    /// Load the stored state once and build a session around it.
    ///
    /// Loading never writes: a corrupt document stays in storage (and in the
    /// recovery log, when `recovery_dir` is set) until the first real change.
    pub fn open(storage: S, config: &Config, recovery_dir: Option<PathBuf>) -> Self {
        let mut gateway = Gateway::new(storage, config.storage_key.clone());
        if let Some(dir) = recovery_dir {
            gateway = gateway.with_recovery_log(dir);
        }
        let state = gateway.load();
        Session {
            store: TaskStore::new(state, config.max_text_len),
            gateway,
            scheduler: SaveScheduler::new(config.save_debounce()),
            last_error: None,
            dirty: false,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        self.gateway.storage()
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.gateway.storage_mut()
    }

    pub fn projected_view(&self) -> ProjectedView<'_> {
        self.store.project()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) {
        self.store.subscribe(listener);
    }

    /// The error from the most recent save, cleared by the next good one
    pub fn last_error(&self) -> Option<&StorageError> {
        self.last_error.as_ref()
    }

    pub fn add_task(&mut self, text: &str, quadrant: Quadrant) -> Option<String> {
        let id = self.store.add(text, quadrant);
        self.changed(id.is_some());
        id
    }

    pub fn update_task(&mut self, id: &str, changes: TaskChanges) -> bool {
        let changed = self.store.update(id, changes);
        self.changed(changed)
    }

    /// Replace a task's text after checking it like new text.
    /// `Ok(false)` means the id is unknown.
    pub fn edit_text(&mut self, id: &str, text: &str) -> Result<bool, TextRejected> {
        let text = self.store.validate_text(text)?.to_string();
        Ok(self.update_task(id, TaskChanges::text(text)))
    }

    pub fn toggle_completed(&mut self, id: &str) -> bool {
        let changed = self.store.toggle_completed(id);
        self.changed(changed)
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let changed = self.store.delete(id);
        self.changed(changed)
    }

    pub fn move_task(&mut self, id: &str, quadrant: Quadrant) -> bool {
        let changed = self.store.move_task(id, quadrant);
        self.changed(changed)
    }

    pub fn reorder(&mut self, proposal: &ProposedOrder) -> bool {
        let changed = self.store.reorder(proposal);
        self.changed(changed)
    }

    pub fn set_last_quadrant(&mut self, quadrant: Quadrant) -> bool {
        let changed = self.store.set_last_quadrant(quadrant);
        self.changed(changed)
    }

    /// Remove every task once `gate` agrees, then save right away.
    ///
    /// Returns None when the user declined, otherwise the outcome of the save.
    pub fn clear_all(
        &mut self,
        gate: &mut impl ConfirmGate,
    ) -> Option<Result<usize, StorageError>> {
        if !gate.confirm(CLEAR_PROMPT) {
            return None;
        }
        let removed = self.store.bulk_clear();
        self.dirty = true;
        tracing::info!(removed, "cleared all tasks");
        Some(self.flush().map(|()| removed))
    }

    /// Run the pending save if its deadline has passed
    pub fn tick(&mut self, now: Instant) -> Option<Result<(), StorageError>> {
        if self.scheduler.fire_if_due(now) {
            Some(self.persist())
        } else {
            None
        }
    }

    /// How long the caller may wait before the next `tick` matters
    pub fn time_until_save(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    /// True while some change has not reached storage, including changes
    /// whose save failed
    pub fn save_pending(&self) -> bool {
        self.dirty || self.scheduler.is_pending()
    }

    /// Cancel any pending save and write now
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.scheduler.cancel();
        self.persist()
    }

    /// Write now, but only if a change is waiting to be saved
    pub fn flush_pending(&mut self) -> Result<(), StorageError> {
        let armed = self.scheduler.cancel();
        if armed || self.dirty {
            self.persist()
        } else {
            Ok(())
        }
    }

    fn changed(&mut self, changed: bool) -> bool {
        if changed {
            self.dirty = true;
            self.scheduler.schedule(Instant::now());
        }
        changed
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        match self.gateway.save(self.store.state()) {
            Ok(at) => {
                self.store.mark_persisted(at);
                self.last_error = None;
                self.dirty = false;
                self.store.emit(Event::Saved);
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                self.store.emit(Event::SaveFailed(e.clone()));
                Err(e)
            }
        }
    }
}
