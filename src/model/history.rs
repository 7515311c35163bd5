use super::schedule::Schedule;

const DEFAULT_LIMIT: usize = 100;

/// Undo/redo over committed schedules.
///
/// Schedules are values, so a history entry is simply the schedule that was
/// current before a commit.
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Schedule>,
    redo: Vec<Schedule>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Remember `previous` before it is replaced. Clears the redo stack.
    pub fn record(&mut self, previous: Schedule) {
        if self.undo.len() == self.limit {
            self.undo.remove(0);
        }
        self.undo.push(previous);
        self.redo.clear();
    }

    /// Step back from `current`, returning the schedule to restore.
    pub fn undo(&mut self, current: &Schedule) -> Option<Schedule> {
        let previous = self.undo.pop()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &Schedule) -> Option<Schedule> {
        let next = self.redo.pop()?;
        self.undo.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn with_task(schedule: &Schedule, name: &str) -> Schedule {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        schedule.add_task(Task::new(name, day, day))
    }

    #[test]
    fn undo_then_redo_restores_states() {
        let mut history = History::default();
        let s0 = Schedule::new();
        let s1 = with_task(&s0, "A");
        history.record(s0.clone());
        let s2 = with_task(&s1, "B");
        history.record(s1.clone());

        let back = history.undo(&s2).unwrap();
        assert_eq!(back, s1);
        let back = history.undo(&back).unwrap();
        assert_eq!(back, s0);
        assert!(!history.can_undo());

        let forward = history.redo(&back).unwrap();
        assert_eq!(forward, s1);
        assert!(history.can_redo());
    }

    #[test]
    fn new_commit_drops_redo() {
        let mut history = History::default();
        let s0 = Schedule::new();
        let s1 = with_task(&s0, "A");
        history.record(s0.clone());
        let restored = history.undo(&s1).unwrap();
        history.record(restored);
        assert!(!history.can_redo());
    }

    #[test]
    fn limit_discards_oldest() {
        let mut history = History::with_limit(2);
        let mut current = Schedule::new();
        for name in ["A", "B", "C"] {
            let next = with_task(&current, name);
            history.record(current);
            current = next;
        }
        let one = history.undo(&current).unwrap();
        let two = history.undo(&one).unwrap();
        assert_eq!(two.tasks().len(), 1);
        assert_eq!(history.undo(&two), None);
    }
}
