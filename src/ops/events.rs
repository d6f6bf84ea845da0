use std::fmt;

use crate::io::storage::StorageError;
use crate::model::task::{Placement, Quadrant};

/// Notifications delivered synchronously to subscribers after a change
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TaskCreated {
        id: String,
        text: String,
        quadrant: Quadrant,
    },
    TaskUpdated {
        id: String,
    },
    TaskDeleted {
        id: String,
    },
    TaskMoved {
        id: String,
        from: Placement,
        to: Quadrant,
    },
    Reordered,
    Cleared {
        removed: usize,
    },
    LastQuadrantChanged(Quadrant),
    Saved,
    SaveFailed(StorageError),
}

pub type Listener = Box<dyn FnMut(&Event)>;

/// Ordered list of event callbacks
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Call every listener in subscription order
    pub fn emit(&mut self, event: &Event) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_emits_in_subscription_order() {
        let (tx, rx) = mpsc::channel();
        let mut listeners = Listeners::default();
        let first = tx.clone();
        listeners.subscribe(move |e| first.send((1, e.clone())).unwrap());
        listeners.subscribe(move |e| tx.send((2, e.clone())).unwrap());

        listeners.emit(&Event::Reordered);
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got, vec![(1, Event::Reordered), (2, Event::Reordered)]);
    }
}
