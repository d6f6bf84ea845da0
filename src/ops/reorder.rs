//! Folding a visual order back into the canonical task list.
//!
//! A reorder gesture in a front end produces a `ProposedOrder`: the ids of
//! each quadrant lane as they now appear on screen, plus the destination of
//! a task dragged across quadrants. `reconcile` turns that into a new
//! canonical list that is always a permutation of the old one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::task::{Quadrant, Task};
use crate::ops::projector::ProjectedView;

/// A task that changed quadrant as part of a gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedTask {
    pub id: String,
    pub to: Quadrant,
}

/// Proposed on-screen order after a reorder gesture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedOrder {
    /// Lane id lists, walked in this order
    pub lists: Vec<(Quadrant, Vec<String>)>,
    pub moved: Option<MovedTask>,
}

impl ProposedOrder {
    /// The order currently on screen, with no move
    pub fn from_view(view: &ProjectedView<'_>) -> Self {
        ProposedOrder {
            lists: Quadrant::ALL.iter().map(|q| (*q, view.ids(*q))).collect(),
            moved: None,
        }
    }

    pub fn with_move(mut self, id: impl Into<String>, to: Quadrant) -> Self {
        self.moved = Some(MovedTask { id: id.into(), to });
        self
    }

    /// Replace one lane's ids, keeping the others
    pub fn replace_lane(mut self, quadrant: Quadrant, ids: Vec<String>) -> Self {
        match self.lists.iter_mut().find(|(q, _)| *q == quadrant) {
            Some((_, lane)) => *lane = ids,
            None => self.lists.push((quadrant, ids)),
        }
        self
    }

    /// Swap a task with its neighbour in its lane. None at the lane edge.
    pub fn shift(view: &ProjectedView<'_>, id: &str, up: bool) -> Option<Self> {
        let (quadrant, index) = view.locate(id)?;
        let len = view.lane(quadrant).len();
        let target = if up {
            index.checked_sub(1)?
        } else if index + 1 < len {
            index + 1
        } else {
            return None;
        };
        let mut order = Self::from_view(view);
        let (_, lane) = order.lists.iter_mut().find(|(q, _)| *q == quadrant)?;
        lane.swap(index, target);
        Some(order)
    }

    /// Drag a task into lane `to` at `index` (end of lane when None or past it).
    pub fn transfer(
        view: &ProjectedView<'_>,
        id: &str,
        to: Quadrant,
        index: Option<usize>,
    ) -> Option<Self> {
        let (from, _) = view.locate(id)?;
        let mut order = Self::from_view(view);
        if let Some((_, lane)) = order.lists.iter_mut().find(|(q, _)| *q == from) {
            lane.retain(|other| other != id);
        }
        let (_, lane) = order.lists.iter_mut().find(|(q, _)| *q == to)?;
        let at = index.map_or(lane.len(), |i| i.min(lane.len()));
        lane.insert(at, id.to_string());
        Some(order.with_move(id, to))
    }

    fn walk(&self) -> impl Iterator<Item = &str> {
        self.lists
            .iter()
            .flat_map(|(_, ids)| ids.iter().map(String::as_str))
    }
}

/// Rebuild the canonical list from a proposed order.
///
/// Tasks appear in the order the proposal names them. Unknown and repeated
/// ids are ignored. Tasks the proposal doesn't mention keep their relative
/// order and go at the end. The moved task takes its new quadrant, and only
/// it gets a fresh `updatedAt`, and only if its quadrant actually changed.
pub fn reconcile(tasks: Vec<Task>, proposal: &ProposedOrder, now: DateTime<Utc>) -> Vec<Task> {
    let index: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();
    let mut slots: Vec<Option<Task>> = tasks.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());

    for id in proposal.walk() {
        if let Some(&i) = index.get(id)
            && let Some(task) = slots[i].take()
        {
            out.push(task);
        }
    }
    out.extend(slots.into_iter().flatten());

    if let Some(moved) = &proposal.moved
        && let Some(task) = out.iter_mut().find(|t| t.id == moved.id)
        && !task.quadrant.is(moved.to)
    {
        task.quadrant = moved.to.into();
        task.touch(now);
    }
    out
}
