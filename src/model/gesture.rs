use egui::Pos2;
use uuid::Uuid;

use super::drag::{DragHandle, DragOutcome};
use super::schedule::{Schedule, ScheduleError, TaskEdit};
use super::task::Task;

/// In-progress inline rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub task_id: Uuid,
    pub name: String,
}

/// The single pointer/keyboard gesture that may be live at a time.
///
/// Starting any gesture replaces the current one. A drag replaced this way
/// is dropped without committing.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragHandle),
    Editing(EditDraft),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn drag(&self) -> Option<&DragHandle> {
        match self {
            Gesture::Dragging(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn edit(&self) -> Option<&EditDraft> {
        match self {
            Gesture::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditDraft> {
        match self {
            Gesture::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    /// Schedule to draw instead of the committed one, once a drag has
    /// passed its threshold.
    pub fn working(&self) -> Option<&Schedule> {
        self.drag().filter(|h| h.is_dragging()).map(|h| h.working())
    }

    pub fn begin_drag(&mut self, handle: DragHandle) {
        if let Gesture::Editing(draft) = self {
            tracing::debug!(task = %draft.task_id, "rename abandoned by drag");
        }
        *self = Gesture::Dragging(handle);
    }

    /// Forward a pointer move to the live drag, if any.
    pub fn update_drag(&mut self, pointer: Pos2) -> Option<&Schedule> {
        match self {
            Gesture::Dragging(handle) => Some(handle.update(pointer)),
            _ => None,
        }
    }

    /// Pointer released: finish the live drag and return to idle.
    pub fn finish_drag(&mut self) -> Option<DragOutcome> {
        match std::mem::take(self) {
            Gesture::Dragging(handle) => Some(handle.commit()),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Start renaming `task`. Any pending drag is cancelled outright.
    pub fn begin_edit(&mut self, task: &Task) {
        if let Gesture::Dragging(handle) = self {
            tracing::debug!(task = %handle.task_id(), "drag cancelled by rename");
        }
        *self = Gesture::Editing(EditDraft {
            task_id: task.id,
            name: task.name.clone(),
        });
    }

    /// Apply the rename draft to `schedule`. Returns `Ok(None)` when there is
    /// nothing to apply (no edit live, blank or unchanged name).
    pub fn commit_edit(&mut self, schedule: &Schedule) -> Result<Option<Schedule>, ScheduleError> {
        let Gesture::Editing(draft) = std::mem::take(self) else {
            return Ok(None);
        };
        let name = draft.name.trim();
        let current = schedule
            .task(draft.task_id)
            .ok_or(ScheduleError::TaskNotFound(draft.task_id))?;
        if name.is_empty() || name == current.name {
            return Ok(None);
        }
        let next = schedule.update_task(
            draft.task_id,
            TaskEdit {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )?;
        tracing::info!(task = %draft.task_id, "task renamed");
        Ok(Some(next))
    }

    /// Abandon a rename. A live drag is left alone: once started it always
    /// ends in [`finish_drag`](Self::finish_drag).
    pub fn cancel_edit(&mut self) {
        if let Gesture::Editing(draft) = self {
            tracing::debug!(task = %draft.task_id, "rename abandoned");
            *self = Gesture::Idle;
        }
    }

    /// Drop whatever is live. Only for when the committed schedule is
    /// replaced wholesale (new or opened project).
    pub fn reset(&mut self) {
        *self = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::drag::DragKind;
    use crate::model::grid::CellMetrics;
    use chrono::NaiveDate;
    use egui::pos2;

    const METRICS: CellMetrics = CellMetrics {
        column_width: 50.0,
        row_height: 90.0,
    };

    fn setup() -> (Schedule, Uuid) {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let task = Task::new("Survey", day, day);
        let id = task.id;
        (Schedule::new().add_task(task), id)
    }

    #[test]
    fn edit_cancels_pending_drag() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_drag(DragHandle::begin(id, DragKind::Move, pos2(0.0, 0.0), METRICS, &schedule).unwrap());
        gesture.update_drag(pos2(100.0, 0.0));
        assert!(gesture.working().is_some());

        gesture.begin_edit(schedule.task(id).unwrap());
        assert!(gesture.drag().is_none());
        assert!(gesture.working().is_none());
        assert_eq!(gesture.finish_drag(), None);
        assert_eq!(gesture.edit().map(|d| d.task_id), Some(id));
    }

    #[test]
    fn cancel_edit_leaves_live_drag_to_commit() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_drag(DragHandle::begin(id, DragKind::Move, pos2(0.0, 0.0), METRICS, &schedule).unwrap());
        gesture.update_drag(pos2(200.0, 0.0));

        gesture.cancel_edit();
        let Some(DragOutcome::Committed(next)) = gesture.finish_drag() else {
            panic!("a drag past the threshold must commit on release");
        };
        let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(next.task(id).map(|t| (t.start_date, t.end_date)), Some((day, day)));
        assert!(gesture.is_idle());
    }

    #[test]
    fn cancel_edit_drops_rename() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_edit(schedule.task(id).unwrap());
        gesture.edit_mut().unwrap().name = "Changed".into();
        gesture.cancel_edit();
        assert!(gesture.is_idle());
        assert_eq!(gesture.commit_edit(&schedule).unwrap(), None);
    }

    #[test]
    fn drag_preempts_edit() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_edit(schedule.task(id).unwrap());
        gesture.begin_drag(DragHandle::begin(id, DragKind::ResizeEnd, pos2(0.0, 0.0), METRICS, &schedule).unwrap());
        assert!(gesture.edit().is_none());
        assert!(matches!(gesture.finish_drag(), Some(DragOutcome::Click(_))));
        assert!(gesture.is_idle());
    }

    #[test]
    fn working_copy_hidden_below_threshold() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_drag(DragHandle::begin(id, DragKind::Move, pos2(0.0, 0.0), METRICS, &schedule).unwrap());
        gesture.update_drag(pos2(1.0, 1.0));
        assert!(gesture.working().is_none());
    }

    #[test]
    fn rename_commits_trimmed_name() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_edit(schedule.task(id).unwrap());
        gesture.edit_mut().unwrap().name = "  Site survey ".into();
        let next = gesture.commit_edit(&schedule).unwrap().unwrap();
        assert_eq!(next.task(id).unwrap().name, "Site survey");
        assert!(gesture.is_idle());
    }

    #[test]
    fn blank_rename_is_ignored() {
        let (schedule, id) = setup();
        let mut gesture = Gesture::default();
        gesture.begin_edit(schedule.task(id).unwrap());
        gesture.edit_mut().unwrap().name = "   ".into();
        assert_eq!(gesture.commit_edit(&schedule).unwrap(), None);
        assert!(gesture.is_idle());
    }

    #[test]
    fn commit_edit_without_edit_is_noop() {
        let (schedule, _) = setup();
        let mut gesture = Gesture::default();
        assert_eq!(gesture.commit_edit(&schedule).unwrap(), None);
    }
}
