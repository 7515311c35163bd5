use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::TaskGroup;
use super::task::Task;

/// Errors raised by operations on a [`Schedule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("select at least two tasks to create a group ({selected} selected)")]
    InsufficientSelection { selected: usize },
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),
    #[error("group not found: {0}")]
    GroupNotFound(Uuid),
    #[error("task {task} is not a member of group {group}")]
    NotAMember { task: Uuid, group: Uuid },
    #[error("group membership out of sync: {0}")]
    InvariantViolation(String),
}

/// Field changes applied by [`Schedule::update_task`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `Some(None)` clears the unit.
    pub executing_unit_id: Option<Option<Uuid>>,
}

/// The task and group collection of a project.
///
/// A `Schedule` is a value: every operation returns a new schedule and leaves
/// `self` untouched, so a reader never observes a half-applied change.
/// `task.group_id` and `group.task_ids` are kept in sync by the operations in
/// this module and in `group.rs`; deserialisation repairs any drift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScheduleParts")]
pub struct Schedule {
    tasks: Vec<Task>,
    groups: Vec<TaskGroup>,
}

/// Raw on-disk shape, healed into a [`Schedule`].
#[derive(Deserialize)]
struct ScheduleParts {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    groups: Vec<TaskGroup>,
}

impl From<ScheduleParts> for Schedule {
    fn from(parts: ScheduleParts) -> Self {
        Schedule::from_parts(parts.tasks, parts.groups)
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schedule from loose parts, repairing group membership.
    pub fn from_parts(tasks: Vec<Task>, groups: Vec<TaskGroup>) -> Self {
        Schedule { tasks, groups }.healed()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn group(&self, id: Uuid) -> Option<&TaskGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest start and latest end over all tasks.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.tasks.iter().map(|t| t.start_date).min()?;
        let end = self.tasks.iter().map(|t| t.end_date).max()?;
        Some((start, end))
    }

    /// The tasks that travel with `task_id` when it is moved: every member of
    /// its group in chain order, or the task alone when it is ungrouped.
    pub fn related_tasks(&self, task_id: Uuid) -> Vec<&Task> {
        let Some(task) = self.task(task_id) else {
            return Vec::new();
        };
        let Some(group_id) = task.group_id else {
            return vec![task];
        };
        match self.group(group_id) {
            Some(group) if group.task_ids.contains(&task_id) => group
                .task_ids
                .iter()
                .filter_map(|id| self.task(*id))
                .collect(),
            _ => {
                debug_assert!(false, "task {} claims group {} which does not list it", task_id, group_id);
                tracing::warn!(task = %task_id, group = %group_id, "treating task with stale group id as ungrouped");
                vec![task]
            }
        }
    }

    // ── Task operations ─────────────────────────────────────────

    /// Append a new task. Any group reference it carries is dropped; grouping
    /// goes through [`Schedule::create_group`].
    pub fn add_task(&self, mut task: Task) -> Schedule {
        task.group_id = None;
        if task.end_date < task.start_date {
            std::mem::swap(&mut task.start_date, &mut task.end_date);
        }
        let mut next = self.clone();
        next.tasks.push(task);
        next
    }

    /// Apply an edit to one task. Dates that would invert are clamped so the
    /// edited field never crosses the other one.
    pub fn update_task(&self, id: Uuid, edit: TaskEdit) -> Result<Schedule, ScheduleError> {
        let mut next = self.clone();
        let task = next
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ScheduleError::TaskNotFound(id))?;

        if let Some(name) = edit.name {
            task.name = name;
        }
        match (edit.start_date, edit.end_date) {
            (Some(start), Some(end)) => {
                task.start_date = start.min(end);
                task.end_date = end.max(start);
            }
            (Some(start), None) => task.start_date = start.min(task.end_date),
            (None, Some(end)) => task.end_date = end.max(task.start_date),
            (None, None) => {}
        }
        if let Some(unit) = edit.executing_unit_id {
            task.executing_unit_id = unit;
        }
        Ok(next)
    }

    /// Point every listed task at `unit`, skipping ids that do not exist.
    pub fn assign_unit(&self, ids: &[Uuid], unit: Option<Uuid>) -> Schedule {
        let mut next = self.clone();
        for task in next.tasks.iter_mut().filter(|t| ids.contains(&t.id)) {
            task.executing_unit_id = unit;
        }
        next
    }

    /// Delete a task, unlinking it from its group first.
    pub fn remove_task(&self, id: Uuid) -> Result<Schedule, ScheduleError> {
        let task = self.task(id).ok_or(ScheduleError::TaskNotFound(id))?;
        let mut next = match task.group_id {
            Some(group_id) if self.group(group_id).is_some() => self.unlink_task(id, group_id)?,
            _ => self.clone(),
        };
        next.tasks.retain(|t| t.id != id);
        Ok(next)
    }

    /// Overwrite a task's dates. Only the drag controller uses this; it keeps
    /// start <= end itself.
    pub(crate) fn set_dates(&mut self, id: Uuid, start: NaiveDate, end: NaiveDate) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.start_date = start;
            task.end_date = end;
        }
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<TaskGroup> {
        &mut self.groups
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }

    // ── Membership consistency ──────────────────────────────────

    /// Check that every group lists exactly the tasks pointing at it.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let violation = |msg: String| Err(ScheduleError::InvariantViolation(msg));
        for group in &self.groups {
            if group.task_ids.len() < 2 {
                return violation(format!("group {} has fewer than two tasks", group.id));
            }
            if group.intervals.len() != group.task_ids.len() - 1 {
                return violation(format!(
                    "group {} has {} intervals for {} tasks",
                    group.id,
                    group.intervals.len(),
                    group.task_ids.len()
                ));
            }
            let mut seen = HashSet::new();
            for id in &group.task_ids {
                if !seen.insert(*id) {
                    return violation(format!("group {} lists task {} twice", group.id, id));
                }
                match self.task(*id) {
                    Some(task) if task.group_id == Some(group.id) => {}
                    Some(_) => {
                        return violation(format!(
                            "group {} lists task {} which points elsewhere",
                            group.id, id
                        ))
                    }
                    None => return violation(format!("group {} lists missing task {}", group.id, id)),
                }
            }
        }
        for task in &self.tasks {
            if let Some(group_id) = task.group_id {
                let listed = self
                    .group(group_id)
                    .is_some_and(|g| g.task_ids.contains(&task.id));
                if !listed {
                    return violation(format!("task {} is not listed by group {}", task.id, group_id));
                }
            }
        }
        Ok(())
    }

    /// Return a copy with membership repaired: tasks a group does not list
    /// become ungrouped, listings of foreign or missing tasks are dropped and
    /// groups left with fewer than two members are deleted.
    pub fn healed(&self) -> Schedule {
        let mut next = self.clone();
        let mut touched: HashSet<Uuid> = HashSet::new();

        let tasks = &next.tasks;
        for group in next.groups.iter_mut() {
            let gid = group.id;
            let before = group.task_ids.len();
            let mut seen = HashSet::new();
            group.task_ids.retain(|id| {
                seen.insert(*id) && tasks.iter().any(|t| t.id == *id && t.group_id == Some(gid))
            });
            if group.task_ids.len() != before
                || group.task_ids.len() < 2
                || group.intervals.len() + 1 != group.task_ids.len()
            {
                tracing::warn!(group = %group.id, dropped = before - group.task_ids.len(), "repairing group listing");
                touched.insert(group.id);
            }
        }

        let groups = &next.groups;
        for task in next.tasks.iter_mut() {
            if let Some(group_id) = task.group_id {
                let listed = groups
                    .iter()
                    .any(|g| g.id == group_id && g.task_ids.contains(&task.id));
                if !listed {
                    tracing::warn!(task = %task.id, group = %group_id, "clearing unlisted group reference");
                    task.group_id = None;
                }
            }
        }

        for group_id in touched {
            next.settle_group(group_id);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn add_task_strips_group_reference() {
        let mut task = Task::new("A", date(1, 1), date(1, 2));
        task.group_id = Some(Uuid::new_v4());
        let schedule = Schedule::new().add_task(task);
        assert_eq!(schedule.tasks()[0].group_id, None);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn add_task_leaves_original_untouched() {
        let empty = Schedule::new();
        let one = empty.add_task(Task::new("A", date(1, 1), date(1, 2)));
        assert!(empty.is_empty());
        assert_eq!(one.tasks().len(), 1);
    }

    #[test]
    fn update_task_clamps_single_date_edits() {
        let task = Task::new("A", date(1, 5), date(1, 8));
        let id = task.id;
        let schedule = Schedule::new().add_task(task);

        let moved = schedule
            .update_task(id, TaskEdit { start_date: Some(date(1, 20)), ..Default::default() })
            .unwrap();
        let t = moved.task(id).unwrap();
        assert_eq!((t.start_date, t.end_date), (date(1, 8), date(1, 8)));

        let moved = schedule
            .update_task(id, TaskEdit { end_date: Some(date(1, 1)), ..Default::default() })
            .unwrap();
        let t = moved.task(id).unwrap();
        assert_eq!((t.start_date, t.end_date), (date(1, 5), date(1, 5)));
    }

    #[test]
    fn update_task_renames_and_sets_unit() {
        let task = Task::new("A", date(1, 5), date(1, 8));
        let id = task.id;
        let unit = Uuid::new_v4();
        let schedule = Schedule::new()
            .add_task(task)
            .update_task(
                id,
                TaskEdit {
                    name: Some("Renamed".into()),
                    executing_unit_id: Some(Some(unit)),
                    ..Default::default()
                },
            )
            .unwrap();
        let t = schedule.task(id).unwrap();
        assert_eq!(t.name, "Renamed");
        assert_eq!(t.executing_unit_id, Some(unit));
    }

    #[test]
    fn update_missing_task_fails() {
        let missing = Uuid::new_v4();
        let err = Schedule::new().update_task(missing, TaskEdit::default()).unwrap_err();
        assert_eq!(err, ScheduleError::TaskNotFound(missing));
    }

    #[test]
    fn assign_unit_touches_only_listed_tasks() {
        let a = Task::new("A", date(1, 1), date(1, 2));
        let b = Task::new("B", date(1, 3), date(1, 4));
        let (a_id, b_id) = (a.id, b.id);
        let unit = Uuid::new_v4();
        let schedule = Schedule::new().add_task(a).add_task(b).assign_unit(&[a_id], Some(unit));
        assert_eq!(schedule.task(a_id).unwrap().executing_unit_id, Some(unit));
        assert_eq!(schedule.task(b_id).unwrap().executing_unit_id, None);
    }

    #[test]
    fn heal_clears_unlisted_group_reference() {
        let mut a = Task::new("A", date(1, 1), date(1, 2));
        a.group_id = Some(Uuid::new_v4());
        let schedule = Schedule::from_parts(vec![a], Vec::new());
        assert_eq!(schedule.tasks()[0].group_id, None);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn heal_drops_group_listing_foreign_tasks() {
        let group_id = Uuid::new_v4();
        let mut a = Task::new("A", date(1, 1), date(1, 2));
        let b = Task::new("B", date(1, 5), date(1, 6));
        a.group_id = Some(group_id);
        let group = TaskGroup {
            id: group_id,
            name: "Broken".into(),
            task_ids: vec![a.id, b.id],
            intervals: vec![3],
        };
        let schedule = Schedule::from_parts(vec![a, b], vec![group]);
        assert!(schedule.groups().is_empty());
        assert!(schedule.tasks().iter().all(|t| t.group_id.is_none()));
    }

    #[test]
    fn heal_dissolves_single_member_group() {
        let group_id = Uuid::new_v4();
        let mut a = Task::new("A", date(1, 1), date(1, 2));
        a.group_id = Some(group_id);
        let group = TaskGroup {
            id: group_id,
            name: "Lonely".into(),
            task_ids: vec![a.id],
            intervals: Vec::new(),
        };
        let schedule = Schedule::from_parts(vec![a], vec![group]);
        assert!(schedule.groups().is_empty());
        assert_eq!(schedule.tasks()[0].group_id, None);
    }

    #[test]
    fn heal_recomputes_mismatched_intervals() {
        let group_id = Uuid::new_v4();
        let mut a = Task::new("A", date(1, 1), date(1, 2));
        let mut b = Task::new("B", date(1, 5), date(1, 6));
        a.group_id = Some(group_id);
        b.group_id = Some(group_id);
        let group = TaskGroup {
            id: group_id,
            name: "Short".into(),
            task_ids: vec![a.id, b.id],
            intervals: Vec::new(),
        };
        let schedule = Schedule::from_parts(vec![a, b], vec![group]);
        assert_eq!(schedule.groups()[0].intervals, vec![3]);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn validate_reports_missing_listing() {
        let mut a = Task::new("A", date(1, 1), date(1, 2));
        a.group_id = Some(Uuid::new_v4());
        let schedule = Schedule { tasks: vec![a], groups: Vec::new() };
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleError::InvariantViolation(_))
        ));
    }

    #[test]
    fn deserialising_heals() {
        let json = format!(
            r#"{{"tasks":[{{"id":"{}","name":"A","startDate":"2024-01-01","endDate":"2024-01-02","groupId":"{}"}}],"groups":[]}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let schedule: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule.tasks()[0].group_id, None);
    }
}
