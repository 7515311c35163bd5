use std::path::{Path, PathBuf};

use crate::model::Project;

#[derive(Debug, thiserror::Error)]
pub enum ProjectIoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not a valid project file: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode project: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Save a project to a JSON file.
pub fn save_project(project: &Project, path: &Path) -> Result<(), ProjectIoError> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json).map_err(|source| ProjectIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), tasks = project.schedule.tasks().len(), "project saved");
    Ok(())
}

/// Load a project from a JSON file. Group membership that is out of sync is
/// repaired while parsing.
pub fn load_project(path: &Path) -> Result<Project, ProjectIoError> {
    let json = std::fs::read_to_string(path).map_err(|source| ProjectIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let project: Project = serde_json::from_str(&json).map_err(|source| ProjectIoError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        tasks = project.schedule.tasks().len(),
        groups = project.schedule.groups().len(),
        "project loaded"
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExecutingUnit, Task};
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn save_then_load_preserves_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");

        let mut project = Project::new("Roundtrip");
        let unit = ExecutingUnit::new("Crew", egui::Color32::from_rgb(10, 20, 30));
        let mut a = Task::new("A", date(1, 1), date(1, 2));
        a.executing_unit_id = Some(unit.id);
        let b = Task::new("B", date(1, 5), date(1, 6));
        let ids = [a.id, b.id];
        project.executing_units.push(unit);
        let (schedule, group) = project.schedule.add_task(a).add_task(b).create_group(&ids, "Pair").unwrap();
        project.commit(schedule);

        save_project(&project, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded, project);
        assert_eq!(loaded.schedule.group(group.id).unwrap().intervals, vec![3]);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_project(&path).unwrap_err();
        assert!(matches!(err, ProjectIoError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_project(&path), Err(ProjectIoError::Parse { .. })));
    }

    #[test]
    fn stale_group_reference_is_repaired_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.json");
        let json = format!(
            r#"{{
                "name": "Stale",
                "startDate": "2024-01-01",
                "endDate": "2024-02-01",
                "tasks": [
                    {{"id": "{}", "name": "A", "startDate": "2024-01-01", "endDate": "2024-01-02", "groupId": "{}"}}
                ],
                "groups": [],
                "created": "2024-01-01T00:00:00Z",
                "modified": "2024-01-01T00:00:00Z"
            }}"#,
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4()
        );
        std::fs::write(&path, json).unwrap();
        let project = load_project(&path).unwrap();
        assert_eq!(project.schedule.tasks()[0].group_id, None);
        assert!(project.executing_units.is_empty());
    }
}
