use indexmap::IndexMap;

use crate::model::task::{Quadrant, Task};

/// Per-quadrant views of the canonical task list.
///
/// Always holds all four quadrants in display order. Each lane keeps the
/// relative order of the canonical list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedView<'a> {
    lanes: IndexMap<Quadrant, Vec<&'a Task>>,
}

/// Split `tasks` into the four quadrant lanes.
///
/// Tasks whose quadrant is not recognized appear in no lane.
pub fn project(tasks: &[Task]) -> ProjectedView<'_> {
    let mut lanes: IndexMap<Quadrant, Vec<&Task>> =
        Quadrant::ALL.iter().map(|q| (*q, Vec::new())).collect();
    for task in tasks {
        if let Some(q) = task.quadrant.quadrant()
            && let Some(lane) = lanes.get_mut(&q)
        {
            lane.push(task);
        }
    }
    ProjectedView { lanes }
}

impl<'a> ProjectedView<'a> {
    pub fn lane(&self, quadrant: Quadrant) -> &[&'a Task] {
        self.lanes.get(&quadrant).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Lanes in display order
    pub fn iter(&self) -> impl Iterator<Item = (Quadrant, &[&'a Task])> {
        self.lanes.iter().map(|(q, tasks)| (*q, tasks.as_slice()))
    }

    /// IDs of one lane, in order
    pub fn ids(&self, quadrant: Quadrant) -> Vec<String> {
        self.lane(quadrant).iter().map(|t| t.id.clone()).collect()
    }

    /// Quadrant and lane index of a visible task
    pub fn locate(&self, id: &str) -> Option<(Quadrant, usize)> {
        self.iter().find_map(|(q, tasks)| {
            tasks.iter().position(|t| t.id == id).map(|i| (q, i))
        })
    }

    /// Number of visible tasks across all lanes
    pub fn visible_count(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }
}
