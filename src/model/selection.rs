use uuid::Uuid;

use super::schedule::{Schedule, ScheduleError};

/// Multi-select state, in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<Uuid>,
}

impl Selection {
    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// The most recently selected task.
    pub fn primary(&self) -> Option<Uuid> {
        self.ids.last().copied()
    }

    pub fn toggle(&mut self, id: Uuid) {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn select_only(&mut self, id: Uuid) {
        self.ids.clear();
        self.ids.push(id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Forget ids that no longer exist in `schedule`.
    pub fn retain_existing(&mut self, schedule: &Schedule) {
        self.ids.retain(|id| schedule.task(*id).is_some());
    }
}

/// Operations the user can run on the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateGroup { name: String },
    AssignUnit(Option<Uuid>),
    /// Take each selected task out of its group.
    Unlink,
    DeleteGroup(Uuid),
    DeleteTasks,
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::CreateGroup { .. } => "Create group",
            Command::AssignUnit(_) => "Assign unit",
            Command::Unlink => "Unlink from group",
            Command::DeleteGroup(_) => "Delete group",
            Command::DeleteTasks => "Delete tasks",
        }
    }

    /// Run the command, producing the next schedule. Nothing is applied if
    /// any step fails.
    pub fn apply(&self, schedule: &Schedule, selection: &Selection) -> Result<Schedule, ScheduleError> {
        match self {
            Command::CreateGroup { name } => {
                let name = if name.trim().is_empty() {
                    format!("Group {}", schedule.groups().len() + 1)
                } else {
                    name.trim().to_string()
                };
                schedule.create_group(selection.ids(), name).map(|(next, _)| next)
            }
            Command::AssignUnit(unit) => Ok(schedule.assign_unit(selection.ids(), *unit)),
            Command::Unlink => selection.ids().iter().try_fold(schedule.clone(), |acc, id| {
                // An earlier unlink may already have dissolved this task's group.
                match acc.task(*id).and_then(|t| t.group_id) {
                    Some(group_id) => acc.unlink_task(*id, group_id),
                    None => Ok(acc),
                }
            }),
            Command::DeleteGroup(group_id) => schedule.delete_group(*group_id),
            Command::DeleteTasks => selection
                .ids()
                .iter()
                .try_fold(schedule.clone(), |acc, id| acc.remove_task(*id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn three() -> (Schedule, Vec<Uuid>) {
        let tasks = [
            Task::new("A", date(1, 1), date(1, 2)),
            Task::new("B", date(1, 5), date(1, 6)),
            Task::new("C", date(1, 10), date(1, 11)),
        ];
        let ids = tasks.iter().map(|t| t.id).collect();
        let schedule = tasks.into_iter().fold(Schedule::new(), |s, t| s.add_task(t));
        (schedule, ids)
    }

    fn select(ids: &[Uuid]) -> Selection {
        let mut selection = Selection::default();
        for id in ids {
            selection.toggle(*id);
        }
        selection
    }

    #[test]
    fn toggle_adds_and_removes() {
        let (_, ids) = three();
        let mut selection = select(&ids[..2]);
        assert_eq!(selection.primary(), Some(ids[1]));
        selection.toggle(ids[0]);
        assert_eq!(selection.ids(), &[ids[1]]);
        selection.select_only(ids[2]);
        assert_eq!(selection.ids(), &[ids[2]]);
    }

    #[test]
    fn create_group_needs_two_selected() {
        let (schedule, ids) = three();
        let err = Command::CreateGroup { name: "G".into() }
            .apply(&schedule, &select(&ids[..1]))
            .unwrap_err();
        assert_eq!(err, ScheduleError::InsufficientSelection { selected: 1 });
    }

    #[test]
    fn blank_group_name_gets_default() {
        let (schedule, ids) = three();
        let next = Command::CreateGroup { name: "  ".into() }
            .apply(&schedule, &select(&ids))
            .unwrap();
        assert_eq!(next.groups()[0].name, "Group 1");
    }

    #[test]
    fn unlink_all_members_dissolves_group() {
        let (schedule, ids) = three();
        let (schedule, _) = schedule.create_group(&ids, "Chain").unwrap();
        let next = Command::Unlink.apply(&schedule, &select(&ids)).unwrap();
        assert!(next.groups().is_empty());
        assert!(next.tasks().iter().all(|t| t.group_id.is_none()));
    }

    #[test]
    fn assign_unit_applies_to_selection() {
        let (schedule, ids) = three();
        let unit = Uuid::new_v4();
        let next = Command::AssignUnit(Some(unit))
            .apply(&schedule, &select(&ids[1..]))
            .unwrap();
        let units: Vec<_> = next.tasks().iter().map(|t| t.executing_unit_id).collect();
        assert_eq!(units, vec![None, Some(unit), Some(unit)]);
    }

    #[test]
    fn delete_tasks_keeps_groups_consistent() {
        let (schedule, ids) = three();
        let (schedule, group) = schedule.create_group(&ids, "Chain").unwrap();
        let next = Command::DeleteTasks.apply(&schedule, &select(&ids[..2])).unwrap();
        assert_eq!(next.tasks().len(), 1);
        assert!(next.group(group.id).is_none());
        assert_eq!(next.tasks()[0].group_id, None);
    }

    #[test]
    fn retain_existing_drops_deleted_ids() {
        let (schedule, ids) = three();
        let mut selection = select(&ids);
        let next = schedule.remove_task(ids[0]).unwrap();
        selection.retain_existing(&next);
        assert_eq!(selection.ids(), &ids[1..]);
    }
}
