use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::Schedule;
use super::task::ExecutingUnit;

/// A planning project: its units, its task schedule and the date range the
/// calendar opens on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub executing_units: Vec<ExecutingUnit>,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            name: "Untitled Project".to_string(),
            start_date: today,
            end_date: today + chrono::Duration::days(90),
            executing_units: Vec::new(),
            schedule: Schedule::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn unit(&self, id: Uuid) -> Option<&ExecutingUnit> {
        self.executing_units.iter().find(|u| u.id == id)
    }

    /// Swap in a new schedule produced by an operation.
    pub fn commit(&mut self, schedule: Schedule) {
        self.schedule = schedule;
        self.touch();
    }

    /// Range the calendar should show: the nominal range widened to cover
    /// every task.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        let (start, end) = (self.start_date.min(self.end_date), self.end_date.max(self.start_date));
        match self.schedule.date_span() {
            Some((first, last)) => (start.min(first), end.max(last)),
            None => (start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn visible_range_covers_tasks() {
        let mut project = Project::new("Range");
        project.start_date = date(2, 1);
        project.end_date = date(2, 28);
        assert_eq!(project.visible_range(), (date(2, 1), date(2, 28)));

        let schedule = project.schedule.add_task(Task::new("Early", date(1, 20), date(1, 22)));
        project.commit(schedule);
        assert_eq!(project.visible_range(), (date(1, 20), date(2, 28)));
    }

    #[test]
    fn json_shape_is_flat() {
        let mut project = Project::new("Shape");
        let a = Task::new("A", date(1, 1), date(1, 2));
        let b = Task::new("B", date(1, 5), date(1, 6));
        let ids = [a.id, b.id];
        let (schedule, _) = project
            .schedule
            .add_task(a)
            .add_task(b)
            .create_group(&ids, "Pair")
            .unwrap();
        project.commit(schedule);

        let json = serde_json::to_value(&project).unwrap();
        assert!(json["tasks"].is_array());
        assert_eq!(json["groups"][0]["taskIds"].as_array().unwrap().len(), 2);
        assert_eq!(json["groups"][0]["intervals"][0], 3);
        assert!(json["executingUnits"].is_array());
        assert!(json.get("schedule").is_none());

        let back: Project = serde_json::from_value(json).unwrap();
        assert_eq!(back, project);
    }
}
