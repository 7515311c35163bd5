use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{Schedule, ScheduleError};
use super::task::Task;

/// An ordered chain of tasks with a target day-gap between each pair of
/// consecutive members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: Uuid,
    pub name: String,
    /// Chronological order as of the last membership change.
    pub task_ids: Vec<Uuid>,
    /// `intervals[i]` is the gap in days between the end of `task_ids[i]`
    /// and the start of `task_ids[i + 1]`. One shorter than `task_ids`.
    pub intervals: Vec<u32>,
}

impl TaskGroup {
    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    pub fn contains(&self, task_id: Uuid) -> bool {
        self.task_ids.contains(&task_id)
    }
}

/// Order tasks by start date, breaking ties by id so the order is stable.
pub fn chronological(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
}

/// Gap in days between consecutive tasks, floored at zero when a later task
/// starts before the earlier one ends.
pub fn compute_intervals(ordered: &[&Task]) -> Vec<u32> {
    ordered
        .windows(2)
        .map(|pair| {
            let gap = (pair[1].start_date - pair[0].end_date).num_days();
            u32::try_from(gap.max(0)).unwrap_or(u32::MAX)
        })
        .collect()
}

impl Schedule {
    /// Bind the selected tasks into a new group.
    ///
    /// Selected tasks are first removed from whatever group they were in;
    /// those groups shrink (re-sorted, intervals recomputed) or disappear
    /// when fewer than two members remain.
    pub fn create_group(
        &self,
        selected: &[Uuid],
        name: impl Into<String>,
    ) -> Result<(Schedule, TaskGroup), ScheduleError> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = selected.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.len() < 2 {
            return Err(ScheduleError::InsufficientSelection { selected: ids.len() });
        }
        if let Some(missing) = ids.iter().find(|id| self.task(**id).is_none()) {
            return Err(ScheduleError::TaskNotFound(*missing));
        }

        let mut next = self.clone();
        next.detach(&seen);

        let mut members: Vec<&Task> = ids.iter().filter_map(|id| next.task(*id)).collect();
        chronological(&mut members);
        let group = TaskGroup {
            id: Uuid::new_v4(),
            name: name.into(),
            task_ids: members.iter().map(|t| t.id).collect(),
            intervals: compute_intervals(&members),
        };

        for task in next.tasks_mut().iter_mut().filter(|t| seen.contains(&t.id)) {
            task.group_id = Some(group.id);
        }
        next.groups_mut().push(group.clone());

        debug_assert!(next.validate().is_ok(), "{:?}", next.validate());
        tracing::info!(group = %group.id, members = group.len(), intervals = ?group.intervals, "created group");
        Ok((next, group))
    }

    /// Remove a group and ungroup all of its members.
    pub fn delete_group(&self, group_id: Uuid) -> Result<Schedule, ScheduleError> {
        if self.group(group_id).is_none() {
            return Err(ScheduleError::GroupNotFound(group_id));
        }
        let mut next = self.clone();
        next.groups_mut().retain(|g| g.id != group_id);
        for task in next.tasks_mut().iter_mut() {
            if task.group_id == Some(group_id) {
                task.group_id = None;
            }
        }

        debug_assert!(next.validate().is_ok(), "{:?}", next.validate());
        tracing::info!(group = %group_id, "deleted group");
        Ok(next)
    }

    /// Take one task out of its group. A group left with a single member is
    /// deleted, otherwise its chain is re-sorted and its intervals recomputed.
    pub fn unlink_task(&self, task_id: Uuid, group_id: Uuid) -> Result<Schedule, ScheduleError> {
        let group = self.group(group_id).ok_or(ScheduleError::GroupNotFound(group_id))?;
        if self.task(task_id).is_none() {
            return Err(ScheduleError::TaskNotFound(task_id));
        }
        if !group.contains(task_id) {
            return Err(ScheduleError::NotAMember {
                task: task_id,
                group: group_id,
            });
        }

        let mut next = self.clone();
        next.detach(&HashSet::from([task_id]));

        debug_assert!(next.validate().is_ok(), "{:?}", next.validate());
        tracing::info!(task = %task_id, group = %group_id, "unlinked task");
        Ok(next)
    }

    /// Remove `ids` from every group that lists them and clear their group
    /// reference, then settle each group that lost members.
    fn detach(&mut self, ids: &HashSet<Uuid>) {
        let mut shrunk = Vec::new();
        for group in self.groups_mut().iter_mut() {
            let before = group.task_ids.len();
            group.task_ids.retain(|id| !ids.contains(id));
            if group.task_ids.len() != before {
                shrunk.push(group.id);
            }
        }
        for task in self.tasks_mut().iter_mut().filter(|t| ids.contains(&t.id)) {
            task.group_id = None;
        }
        for group_id in shrunk {
            self.settle_group(group_id);
        }
    }

    /// Re-derive a group's chain from its current members: delete it when it
    /// has fewer than two, otherwise re-sort by current start date and
    /// recompute the intervals.
    pub(crate) fn settle_group(&mut self, group_id: Uuid) {
        let Some(group) = self.group(group_id) else {
            return;
        };

        if group.task_ids.len() < 2 {
            let orphans = group.task_ids.clone();
            self.groups_mut().retain(|g| g.id != group_id);
            for task in self.tasks_mut().iter_mut() {
                if orphans.contains(&task.id) || task.group_id == Some(group_id) {
                    task.group_id = None;
                }
            }
            tracing::debug!(group = %group_id, "group dissolved below two members");
            return;
        }

        let mut members: Vec<&Task> = group.task_ids.iter().filter_map(|id| self.task(*id)).collect();
        chronological(&mut members);
        let task_ids: Vec<Uuid> = members.iter().map(|t| t.id).collect();
        let intervals = compute_intervals(&members);

        if let Some(group) = self.groups_mut().iter_mut().find(|g| g.id == group_id) {
            group.task_ids = task_ids;
            group.intervals = intervals;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn schedule_of(tasks: &[(&str, NaiveDate, NaiveDate)]) -> (Schedule, Vec<Uuid>) {
        tasks.iter().fold((Schedule::new(), Vec::new()), |(s, mut ids), (name, start, end)| {
            let task = Task::new(*name, *start, *end);
            ids.push(task.id);
            (s.add_task(task), ids)
        })
    }

    #[test]
    fn create_group_orders_by_start_and_measures_gaps() {
        let (schedule, ids) = schedule_of(&[
            ("B", date(1, 5), date(1, 6)),
            ("A", date(1, 1), date(1, 2)),
        ]);
        let (next, group) = schedule.create_group(&ids, "Chain").unwrap();
        assert_eq!(group.task_ids, vec![ids[1], ids[0]]);
        assert_eq!(group.intervals, vec![3]);
        assert!(next.tasks().iter().all(|t| t.group_id == Some(group.id)));
        assert!(schedule.groups().is_empty());
    }

    #[test]
    fn overlapping_members_get_zero_gap() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 10)),
            ("B", date(1, 3), date(1, 4)),
        ]);
        let (_, group) = schedule.create_group(&ids, "Overlap").unwrap();
        assert_eq!(group.intervals, vec![0]);
    }

    #[test]
    fn adjacent_days_have_gap_of_one() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 3), date(1, 3)),
        ]);
        let (_, group) = schedule.create_group(&ids, "Tight").unwrap();
        assert_eq!(group.intervals, vec![1]);
    }

    #[test]
    fn same_start_ties_break_by_id() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 1), date(1, 3)),
        ]);
        let (_, group) = schedule.create_group(&ids, "Tie").unwrap();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(group.task_ids, expected);
    }

    #[test]
    fn create_group_needs_two_distinct_tasks() {
        let (schedule, ids) = schedule_of(&[("A", date(1, 1), date(1, 2))]);
        let err = schedule.create_group(&[ids[0], ids[0]], "Solo").unwrap_err();
        assert_eq!(err, ScheduleError::InsufficientSelection { selected: 1 });
        let err = schedule.create_group(&[], "Empty").unwrap_err();
        assert_eq!(err, ScheduleError::InsufficientSelection { selected: 0 });
    }

    #[test]
    fn create_group_rejects_unknown_ids() {
        let (schedule, ids) = schedule_of(&[("A", date(1, 1), date(1, 2))]);
        let ghost = Uuid::new_v4();
        let err = schedule.create_group(&[ids[0], ghost], "Ghost").unwrap_err();
        assert_eq!(err, ScheduleError::TaskNotFound(ghost));
    }

    #[test]
    fn regrouping_shrinks_previous_group() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
            ("D", date(1, 20), date(1, 21)),
        ]);
        let (schedule, first) = schedule.create_group(&ids[..3], "First").unwrap();
        let (schedule, second) = schedule.create_group(&[ids[1], ids[3]], "Second").unwrap();

        let first = schedule.group(first.id).unwrap();
        assert_eq!(first.task_ids, vec![ids[0], ids[2]]);
        assert_eq!(first.intervals, vec![8]);
        assert_eq!(schedule.task(ids[1]).unwrap().group_id, Some(second.id));
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn regrouping_deletes_group_left_with_one_member() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
        ]);
        let (schedule, first) = schedule.create_group(&ids[..2], "First").unwrap();
        let (schedule, _) = schedule.create_group(&ids[1..], "Second").unwrap();

        assert!(schedule.group(first.id).is_none());
        assert_eq!(schedule.task(ids[0]).unwrap().group_id, None);
        assert_eq!(schedule.groups().len(), 1);
    }

    #[test]
    fn shrunk_group_resorts_by_current_dates() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
        ]);
        let (mut schedule, group) = schedule.create_group(&ids, "Chain").unwrap();
        // A is dragged past C.
        schedule.set_dates(ids[0], date(1, 20), date(1, 21));
        let schedule = schedule.unlink_task(ids[1], group.id).unwrap();

        let group = schedule.group(group.id).unwrap();
        assert_eq!(group.task_ids, vec![ids[2], ids[0]]);
        assert_eq!(group.intervals, vec![9]);
    }

    #[test]
    fn unlink_middle_member_recomputes() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
        ]);
        let (schedule, group) = schedule.create_group(&ids, "Chain").unwrap();
        assert_eq!(group.intervals, vec![3, 4]);

        let next = schedule.unlink_task(ids[1], group.id).unwrap();
        let shrunk = next.group(group.id).unwrap();
        assert_eq!(shrunk.task_ids, vec![ids[0], ids[2]]);
        assert_eq!(shrunk.intervals, vec![8]);
        assert_eq!(next.task(ids[1]).unwrap().group_id, None);
    }

    #[test]
    fn unlink_to_singleton_deletes_group() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
        ]);
        let (schedule, group) = schedule.create_group(&ids, "Pair").unwrap();
        let next = schedule.unlink_task(ids[1], group.id).unwrap();
        assert!(next.groups().is_empty());
        assert!(next.tasks().iter().all(|t| t.group_id.is_none()));
    }

    #[test]
    fn unlink_requires_membership() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
        ]);
        let (schedule, group) = schedule.create_group(&ids[..2], "Pair").unwrap();
        let err = schedule.unlink_task(ids[2], group.id).unwrap_err();
        assert_eq!(err, ScheduleError::NotAMember { task: ids[2], group: group.id });

        let ghost = Uuid::new_v4();
        let err = schedule.unlink_task(ids[0], ghost).unwrap_err();
        assert_eq!(err, ScheduleError::GroupNotFound(ghost));
    }

    #[test]
    fn delete_group_clears_members() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
        ]);
        let (schedule, group) = schedule.create_group(&ids, "Chain").unwrap();
        let next = schedule.delete_group(group.id).unwrap();
        assert!(next.groups().is_empty());
        assert!(next.tasks().iter().all(|t| t.group_id.is_none()));
        assert_eq!(
            next.delete_group(group.id).unwrap_err(),
            ScheduleError::GroupNotFound(group.id)
        );
    }

    #[test]
    fn removing_grouped_task_keeps_membership_consistent() {
        let (schedule, ids) = schedule_of(&[
            ("A", date(1, 1), date(1, 2)),
            ("B", date(1, 5), date(1, 6)),
            ("C", date(1, 10), date(1, 11)),
        ]);
        let (schedule, group) = schedule.create_group(&ids, "Chain").unwrap();
        let next = schedule.remove_task(ids[0]).unwrap();
        assert_eq!(next.tasks().len(), 2);
        assert_eq!(next.group(group.id).unwrap().task_ids, vec![ids[1], ids[2]]);
        assert_eq!(next.group(group.id).unwrap().intervals, vec![4]);
        assert!(next.validate().is_ok());
    }
}
