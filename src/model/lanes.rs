//! Packs the tasks of one week row into non-overlapping lanes.

use std::cmp::Reverse;

use chrono::NaiveDate;
use uuid::Uuid;

use super::grid::{week_end, week_span, WeekSpan};
use super::task::Task;

/// A task placed in a lane, with its extent clamped to the week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneItem<'a> {
    pub task: &'a Task,
    pub span: WeekSpan,
}

pub type Lane<'a> = Vec<LaneItem<'a>>;

/// Which tasks the calendar currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the task name.
    pub query: String,
    pub executing_unit: Option<Uuid>,
}

impl TaskFilter {
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || self.executing_unit.is_some()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(unit) = self.executing_unit {
            if task.executing_unit_id != Some(unit) {
                return false;
            }
        }
        let query = self.query.trim();
        query.is_empty() || task.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Tasks passing `filter` that intersect the week anchored at `anchor`.
pub fn tasks_in_week<'a>(tasks: &'a [Task], anchor: NaiveDate, filter: &TaskFilter) -> Vec<&'a Task> {
    let last = week_end(anchor);
    tasks
        .iter()
        .filter(|t| t.intersects(anchor, last) && filter.matches(t))
        .collect()
}

/// Assign each task to the first lane where it overlaps nothing.
///
/// Tasks are placed in order of clamped start, longer spans first on ties.
/// First-fit is not always minimal but is stable: the same input always
/// produces the same lanes. Tasks outside the week are ignored.
pub fn pack_lanes<'a>(tasks: &[&'a Task], anchor: NaiveDate) -> Vec<Lane<'a>> {
    let mut items: Vec<LaneItem<'a>> = tasks
        .iter()
        .copied()
        .filter_map(|task| week_span(task, anchor).map(|span| LaneItem { task, span }))
        .collect();
    items.sort_by_key(|item| (item.span.start_col, Reverse(item.span.end_col)));

    let mut lanes: Vec<Lane<'a>> = Vec::new();
    for item in items {
        match lanes
            .iter_mut()
            .find(|lane| lane.iter().all(|placed| !placed.span.overlaps(&item.span)))
        {
            Some(lane) => lane.push(item),
            None => lanes.push(vec![item]),
        }
    }
    lanes
}
