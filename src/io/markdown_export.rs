use std::fmt::Write as _;
use std::path::Path;

use crate::io::ProjectIoError;
use crate::model::grid::{self, WeekStart};
use crate::model::{Project, Task};

/// Render the project as a Markdown outline: one section per week listing
/// the tasks that start in it, followed by each group's chain and gaps.
pub fn render_markdown(project: &Project, week_start: WeekStart) -> String {
    let mut out = String::new();
    let (start, end) = project.visible_range();
    let _ = writeln!(out, "# {}\n", project.name);
    let _ = writeln!(out, "{} – {}\n", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"));

    let tasks = project.schedule.tasks();
    for anchor in grid::weeks_in_range(start, end, week_start) {
        let last = grid::week_end(anchor);
        let mut starting: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.start_date >= anchor && t.start_date <= last)
            .collect();
        if starting.is_empty() {
            continue;
        }
        starting.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.name.cmp(&b.name)));

        let _ = writeln!(out, "## Week of {}\n", anchor.format("%Y-%m-%d"));
        for task in starting {
            let _ = write!(out, "- **{}** ({})", task.name, date_range(task));
            if let Some(unit) = task.executing_unit_id.and_then(|id| project.unit(id)) {
                let _ = write!(out, " · {}", unit.name);
            }
            if let Some(group) = task.group_id.and_then(|id| project.schedule.group(id)) {
                let _ = write!(out, " · group: {}", group.name);
            }
            out.push('\n');
        }
        out.push('\n');
    }

    let groups = project.schedule.groups();
    if !groups.is_empty() {
        let _ = writeln!(out, "## Groups\n");
        for group in groups {
            let _ = writeln!(out, "### {}\n", group.name);
            for (i, id) in group.task_ids.iter().enumerate() {
                let Some(task) = project.schedule.task(*id) else {
                    continue;
                };
                let _ = writeln!(out, "{}. {} ({})", i + 1, task.name, date_range(task));
                if let Some(gap) = group.intervals.get(i) {
                    let _ = writeln!(out, "   - then {} day{} gap", gap, if *gap == 1 { "" } else { "s" });
                }
            }
            out.push('\n');
        }
    }
    out
}

fn date_range(task: &Task) -> String {
    if task.start_date == task.end_date {
        task.start_date.format("%Y-%m-%d").to_string()
    } else {
        format!(
            "{} – {}",
            task.start_date.format("%Y-%m-%d"),
            task.end_date.format("%Y-%m-%d")
        )
    }
}

/// Write [`render_markdown`] output to `path`.
pub fn export_markdown(project: &Project, path: &Path, week_start: WeekStart) -> Result<(), ProjectIoError> {
    std::fs::write(path, render_markdown(project, week_start)).map_err(|source| ProjectIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "exported Markdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn lists_weeks_and_group_gaps() {
        let mut project = Project::new("Plan");
        project.start_date = date(1, 1);
        project.end_date = date(1, 14);
        let a = Task::new("Dig", date(1, 1), date(1, 2));
        let b = Task::new("Pour", date(1, 3), date(1, 3));
        let c = Task::new("Cure", date(1, 10), date(1, 12));
        let ids = [a.id, b.id, c.id];
        let (schedule, _) = project
            .schedule
            .add_task(c)
            .add_task(a)
            .add_task(b)
            .create_group(&ids, "Foundation")
            .unwrap();
        project.commit(schedule);

        let md = render_markdown(&project, WeekStart::Monday);
        assert!(md.starts_with("# Plan\n"));
        let week1 = md.find("## Week of 2024-01-01").unwrap();
        let week2 = md.find("## Week of 2024-01-08").unwrap();
        let dig = md.find("- **Dig** (2024-01-01 – 2024-01-02) · group: Foundation").unwrap();
        let pour = md.find("- **Pour** (2024-01-03)").unwrap();
        assert!(week1 < dig && dig < pour && pour < week2);
        assert!(md.contains("1. Dig (2024-01-01 – 2024-01-02)\n   - then 1 day gap\n"));
        assert!(md.contains("2. Pour (2024-01-03)\n   - then 7 days gap\n"));
        assert!(md.contains("3. Cure (2024-01-10 – 2024-01-12)\n\n"));
    }
}
