use std::path::Path;

use crate::io::ProjectIoError;
use crate::model::Project;

const HEADER: [&str; 5] = ["Task Label", "Start Date", "End Date", "Executing Unit", "Group"];

/// Write the project's tasks as semicolon-delimited CSV.
///
/// Columns: Task Label ; Start Date ; End Date ; Executing Unit ; Group
/// Dates are formatted as YYYY-MM-DD. Returns the number of tasks written.
pub fn write_csv<W: std::io::Write>(project: &Project, writer: W) -> Result<usize, ProjectIoError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(HEADER)?;

    let tasks = project.schedule.tasks();
    for task in tasks {
        let unit = task
            .executing_unit_id
            .and_then(|id| project.unit(id))
            .map(|u| u.name.as_str())
            .unwrap_or("");
        let group = task
            .group_id
            .and_then(|id| project.schedule.group(id))
            .map(|g| g.name.as_str())
            .unwrap_or("");
        let start = task.start_date.format("%Y-%m-%d").to_string();
        let end = task.end_date.format("%Y-%m-%d").to_string();
        wtr.write_record([task.name.as_str(), start.as_str(), end.as_str(), unit, group])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(tasks.len())
}

/// Export the project's tasks to a CSV file.
pub fn export_csv(project: &Project, path: &Path) -> Result<usize, ProjectIoError> {
    let file = std::fs::File::create(path).map_err(|source| ProjectIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let count = write_csv(project, file)?;
    tracing::info!(path = %path.display(), count, "exported CSV");
    Ok(count)
}
