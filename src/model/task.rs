use chrono::NaiveDate;
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task laid out on the calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    /// Inclusive. Always `>= start_date`.
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executing_unit_id: Option<Uuid>,
    /// Maintained only through the group operations on `Schedule`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
}

impl Task {
    /// Create an ungrouped task. Dates given in the wrong order are swapped.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date: start.min(end),
            end_date: end.max(start),
            executing_unit_id: None,
            group_id: None,
        }
    }

    /// Length in days between start and end (0 for a single-day task).
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Inclusive interval intersection against `[from, to]`.
    pub fn intersects(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date.max(from) <= self.end_date.min(to)
    }
}

/// A team, person or machine that executes tasks. Only referenced by tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutingUnit {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "color_serde")]
    pub color: Color32,
}

impl ExecutingUnit {
    pub fn new(name: impl Into<String>, color: Color32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color,
        }
    }
}

/// Serde helper storing `Color32` as a `#rrggbb` string.
mod color_serde {
    use egui::Color32;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!(
            "#{:02x}{:02x}{:02x}",
            color.r(),
            color.g(),
            color.b()
        ))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(de::Error::custom(format!("invalid colour '{}'", raw)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| de::Error::custom(format!("invalid colour '{}'", raw)))
        };
        Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn new_task_orders_dates() {
        let task = Task::new("Backwards", date(1, 5), date(1, 2));
        assert_eq!(task.start_date, date(1, 2));
        assert_eq!(task.end_date, date(1, 5));
        assert_eq!(task.duration_days(), 3);
    }

    #[test]
    fn intersects_is_inclusive() {
        let task = Task::new("Edge", date(1, 7), date(1, 9));
        assert!(task.intersects(date(1, 1), date(1, 7)));
        assert!(task.intersects(date(1, 9), date(1, 15)));
        assert!(!task.intersects(date(1, 10), date(1, 16)));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut task = Task::new("Pour concrete", date(1, 1), date(1, 2));
        task.group_id = Some(Uuid::nil());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["startDate"], "2024-01-01");
        assert_eq!(json["endDate"], "2024-01-02");
        assert_eq!(json["groupId"], Uuid::nil().to_string());
        assert!(json.get("executingUnitId").is_none());
    }

    #[test]
    fn unit_colour_is_hex() {
        let unit = ExecutingUnit::new("Crane", Color32::from_rgb(255, 128, 0));
        let json = serde_json::to_string(&unit).unwrap();
        assert!(json.contains("\"#ff8000\""));
        let back: ExecutingUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(back.color, Color32::from_rgb(255, 128, 0));
    }

    #[test]
    fn rejects_malformed_colour() {
        let json = format!(
            r##"{{"id":"{}","name":"x","color":"#12"}}"##,
            Uuid::nil()
        );
        assert!(serde_json::from_str::<ExecutingUnit>(&json).is_err());
    }
}
