use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::io::AppSettings;
use crate::model::{Command, ExecutingUnit, Gesture, History, Project, Schedule, Selection, Task, TaskFilter, WeekStart};
use crate::ui;
use crate::ui::calendar_view::CalendarInteraction;
use crate::ui::inspector::InspectorAction;
use crate::ui::task_list::TaskListAction;

/// Main application state.
pub struct CalendarApp {
    pub project: Project,
    pub file_path: Option<PathBuf>,
    pub settings: AppSettings,
    settings_path: PathBuf,
    pub history: History,

    pub selection: Selection,
    pub gesture: Gesture,
    pub filter: TaskFilter,
    /// Week to bring into view on the next frame.
    pub scroll_to: Option<NaiveDate>,

    // Dialog state
    pub show_add_task: bool,
    pub show_add_unit: bool,
    pub show_create_group: bool,
    pub show_about: bool,
    pub new_task_name: String,
    pub new_task_start_date: NaiveDate,
    pub new_task_end_date: NaiveDate,
    pub new_task_unit: Option<Uuid>,
    pub new_group_name: String,
    pub new_unit_name: String,
    pub new_unit_color: egui::Color32,

    pub status_message: String,
}

impl CalendarApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        ui::theme::install_fonts(&cc.egui_ctx);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings_path = AppSettings::default_path();
        let settings = AppSettings::load(&settings_path);
        tracing::info!(path = %settings_path.display(), "settings loaded");

        let mut app = Self::with_settings(settings, settings_path);
        if let Some(recent) = app.settings.recent_file.clone() {
            app.open_path(&recent);
        }
        app
    }

    /// App state around the sample project, without touching the window.
    pub fn with_settings(settings: AppSettings, settings_path: PathBuf) -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            project: Self::sample_project(),
            file_path: None,
            settings,
            settings_path,
            history: History::default(),
            selection: Selection::default(),
            gesture: Gesture::default(),
            filter: TaskFilter::default(),
            scroll_to: Some(today),
            show_add_task: false,
            show_add_unit: false,
            show_create_group: false,
            show_about: false,
            new_task_name: String::new(),
            new_task_start_date: today,
            new_task_end_date: today + chrono::Duration::days(2),
            new_task_unit: None,
            new_group_name: String::new(),
            new_unit_name: String::new(),
            new_unit_color: ui::theme::unit_color(0),
            status_message: "Ready".to_string(),
        }
    }

    /// Generate a sample project for demonstration.
    fn sample_project() -> Project {
        let today = chrono::Local::now().date_naive();
        let day = |offset: i64| today + chrono::Duration::days(offset);
        let mut project = Project::new("Sample Project");
        project.start_date = day(-14);
        project.end_date = day(56);

        let crew = ExecutingUnit::new("Site crew", ui::theme::unit_color(0));
        let electric = ExecutingUnit::new("Electricians", ui::theme::unit_color(1));
        let inspect = ExecutingUnit::new("Inspection", ui::theme::unit_color(3));

        let mut tasks = vec![
            (Task::new("Excavation", day(-3), day(1)), Some(crew.id)),
            (Task::new("Foundation pour", day(4), day(5)), Some(crew.id)),
            (Task::new("Curing check", day(12), day(12)), Some(inspect.id)),
            (Task::new("Wiring rough-in", day(2), day(9)), Some(electric.id)),
            (Task::new("Permit review", day(0), day(3)), None),
            (Task::new("Framing", day(14), day(22)), Some(crew.id)),
        ];
        for (task, unit) in &mut tasks {
            task.executing_unit_id = *unit;
        }
        let chain: Vec<Uuid> = tasks.iter().take(3).map(|(t, _)| t.id).collect();

        let schedule = tasks
            .into_iter()
            .fold(Schedule::new(), |s, (task, _)| s.add_task(task));
        project.schedule = match schedule.create_group(&chain, "Foundation") {
            Ok((grouped, _)) => grouped,
            Err(e) => {
                tracing::warn!(error = %e, "sample group not created");
                schedule
            }
        };
        project.executing_units = vec![crew, electric, inspect];
        project
    }

    // --- File operations ---

    pub fn new_project(&mut self) {
        self.replace_project(Project::default(), None);
        self.status_message = "New project created".to_string();
    }

    pub fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Calendar Project", &["calendar.json", "json"])
            .pick_file()
        {
            self.open_path(&path);
        }
    }

    pub fn open_path(&mut self, path: &Path) {
        match crate::io::load_project(path) {
            Ok(project) => {
                self.replace_project(project, Some(path.to_path_buf()));
                self.remember_recent(path);
                self.status_message = "Project loaded".to_string();
            }
            Err(e) => {
                tracing::warn!(error = %e, "project not loaded");
                self.status_message = format!("Error loading: {e}");
            }
        }
    }

    pub fn save_project(&mut self) {
        match self.file_path.clone() {
            Some(path) => self.save_to(&path),
            None => self.save_project_as(),
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Calendar Project", &["calendar.json", "json"])
            .set_file_name(format!("{}.calendar.json", self.project.name))
            .save_file()
        {
            self.file_path = Some(path.clone());
            self.save_to(&path);
        }
    }

    fn save_to(&mut self, path: &Path) {
        self.project.touch();
        match crate::io::save_project(&self.project, path) {
            Ok(()) => {
                self.remember_recent(path);
                self.status_message = "Project saved".to_string();
            }
            Err(e) => self.status_message = format!("Error saving: {e}"),
        }
    }

    pub fn export_csv(&mut self) {
        if self.project.schedule.is_empty() {
            self.status_message = "Nothing to export: project has no tasks".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", self.project.name))
            .save_file()
        {
            self.status_message = match crate::io::csv_export::export_csv(&self.project, &path) {
                Ok(count) => format!("Exported {count} tasks to CSV"),
                Err(e) => format!("CSV export failed: {e}"),
            };
        }
    }

    pub fn export_markdown(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Markdown", &["md"])
            .set_file_name(format!("{}.md", self.project.name))
            .save_file()
        {
            self.status_message = match crate::io::markdown_export::export_markdown(
                &self.project,
                &path,
                self.settings.week_start,
            ) {
                Ok(()) => format!("Exported plan to {}", path.display()),
                Err(e) => format!("Markdown export failed: {e}"),
            };
        }
    }

    pub fn open_settings_folder(&mut self) {
        let Some(dir) = self.settings_path.parent() else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| open::that(dir)) {
            self.status_message = format!("Cannot open {}: {e}", dir.display());
        }
    }

    fn replace_project(&mut self, project: Project, path: Option<PathBuf>) {
        self.project = project;
        self.file_path = path;
        self.selection.clear();
        self.gesture.reset();
        self.history.clear();
        self.scroll_to = Some(self.project.visible_range().0);
    }

    fn remember_recent(&mut self, path: &Path) {
        if self.settings.recent_file.as_deref() != Some(path) {
            self.settings.recent_file = Some(path.to_path_buf());
            self.settings.save(&self.settings_path);
        }
    }

    pub fn set_week_start(&mut self, week_start: WeekStart) {
        self.settings.week_start = week_start;
        self.settings.save(&self.settings_path);
        self.status_message = format!("Weeks start on {:?}", week_start);
    }

    // --- Schedule changes ---

    /// Make `next` the committed schedule, keeping the old one for undo.
    pub fn apply(&mut self, next: Schedule, message: impl Into<String>) {
        if next == self.project.schedule {
            return;
        }
        let previous = std::mem::replace(&mut self.project.schedule, next);
        self.history.record(previous);
        self.project.touch();
        self.selection.retain_existing(&self.project.schedule);
        self.status_message = message.into();
    }

    pub fn run_command(&mut self, command: Command) {
        match command.apply(&self.project.schedule, &self.selection) {
            Ok(next) => {
                tracing::info!(command = command.label(), selected = self.selection.len(), "command applied");
                self.apply(next, command.label());
            }
            Err(e) => {
                tracing::warn!(command = command.label(), error = %e, "command rejected");
                self.status_message = e.to_string();
            }
        }
    }

    pub fn undo(&mut self) {
        // A live drag finishes on release; stepping history under it would
        // be overwritten by its commit.
        if self.gesture.drag().is_some() {
            return;
        }
        if let Some(previous) = self.history.undo(&self.project.schedule) {
            self.gesture.cancel_edit();
            self.project.commit(previous);
            self.selection.retain_existing(&self.project.schedule);
            self.status_message = "Undo".to_string();
        }
    }

    pub fn redo(&mut self) {
        // A live drag finishes on release; stepping history under it would
        // be overwritten by its commit.
        if self.gesture.drag().is_some() {
            return;
        }
        if let Some(next) = self.history.redo(&self.project.schedule) {
            self.gesture.cancel_edit();
            self.project.commit(next);
            self.selection.retain_existing(&self.project.schedule);
            self.status_message = "Redo".to_string();
        }
    }

    pub fn open_add_task(&mut self, on: Option<NaiveDate>) {
        let start = on.unwrap_or_else(|| chrono::Local::now().date_naive());
        self.new_task_start_date = start;
        self.new_task_end_date = start;
        self.show_add_task = true;
    }

    pub fn create_task_from_dialog(&mut self) {
        let name = match self.new_task_name.trim() {
            "" => "New Task".to_string(),
            name => name.to_string(),
        };
        let mut task = Task::new(name, self.new_task_start_date, self.new_task_end_date);
        task.executing_unit_id = self.new_task_unit;
        let id = task.id;

        let next = self.project.schedule.add_task(task);
        self.apply(next, "Task added");
        self.selection.select_only(id);
        self.new_task_name.clear();
    }

    pub fn create_unit_from_dialog(&mut self) {
        let name = match self.new_unit_name.trim() {
            "" => format!("Unit {}", self.project.executing_units.len() + 1),
            name => name.to_string(),
        };
        self.project.executing_units.push(ExecutingUnit::new(name, self.new_unit_color));
        self.project.touch();
        self.new_unit_name.clear();
        self.new_unit_color = ui::theme::unit_color(self.project.executing_units.len());
        self.status_message = "Unit added".to_string();
    }

    pub fn delete_task(&mut self, id: Uuid) {
        match self.project.schedule.remove_task(id) {
            Ok(next) => self.apply(next, "Task deleted"),
            Err(e) => self.status_message = e.to_string(),
        }
    }

    fn handle_calendar(&mut self, interaction: CalendarInteraction) {
        if let Some(next) = interaction.committed {
            let moved = count_date_changes(&self.project.schedule, &next);
            let message = match moved {
                0 => "Task renamed".to_string(),
                1 => "Moved 1 task".to_string(),
                n => format!("Moved {n} tasks"),
            };
            self.apply(next, message);
        }
        if let Some((id, additive)) = interaction.clicked {
            if additive {
                self.selection.toggle(id);
            } else {
                self.selection.select_only(id);
            }
        }
        if interaction.cleared_selection {
            self.selection.clear();
        }
        if let Some(date) = interaction.add_on {
            self.open_add_task(Some(date));
        }
        if let Some(error) = interaction.error {
            self.status_message = error;
        }
    }

    fn handle_inspector(&mut self, action: InspectorAction) {
        match action {
            InspectorAction::None => {}
            InspectorAction::Edit(id, edit) => match self.project.schedule.update_task(id, edit) {
                Ok(next) => self.apply(next, "Task updated"),
                Err(e) => self.status_message = e.to_string(),
            },
            InspectorAction::Unlink { task_id, group_id } => {
                match self.project.schedule.unlink_task(task_id, group_id) {
                    Ok(next) => self.apply(next, "Task unlinked"),
                    Err(e) => self.status_message = e.to_string(),
                }
            }
            InspectorAction::Run(command) => self.run_command(command),
            InspectorAction::Reveal(id) => {
                if let Some(task) = self.project.schedule.task(id) {
                    self.scroll_to = Some(task.start_date);
                }
                self.selection.select_only(id);
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Keys typed into a text field belong to the field.
        let typing = ctx.wants_keyboard_input();
        let (save, undo, redo, link, delete) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            (
                cmd && i.key_pressed(egui::Key::S),
                cmd && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                cmd && (i.key_pressed(egui::Key::Y) || (i.modifiers.shift && i.key_pressed(egui::Key::Z))),
                cmd && i.key_pressed(egui::Key::G),
                i.key_pressed(egui::Key::Delete),
            )
        });
        if save {
            self.save_project();
        }
        if typing {
            return;
        }
        if undo {
            self.undo();
        }
        if redo {
            self.redo();
        }
        if link && self.selection.len() >= 2 {
            self.show_create_group = true;
        }
        if delete && !self.selection.is_empty() && self.gesture.is_idle() {
            self.run_command(Command::DeleteTasks);
        }
    }
}

/// Tasks whose dates differ between two schedules.
fn count_date_changes(before: &Schedule, after: &Schedule) -> usize {
    after
        .tasks()
        .iter()
        .filter(|t| {
            before
                .task(t.id)
                .is_some_and(|old| old.start_date != t.start_date || old.end_date != t.end_date)
        })
        .count()
}

impl eframe::App for CalendarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let schedule = &self.project.schedule;
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Groups: {} · Selected: {}",
                                schedule.tasks().len(),
                                schedule.groups().len(),
                                self.selection.len()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        let mut list_action = TaskListAction::None;
        let mut inspector_action = InspectorAction::None;
        egui::SidePanel::left("task_panel")
            .default_width(300.0)
            .min_width(240.0)
            .max_width(520.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                list_action = ui::task_list::show_task_list(&self.project, &self.selection, &mut self.filter, ui);
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("inspector")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        inspector_action = ui::inspector::show_inspector(&self.project, &self.selection, ui);
                    });
            });

        match list_action {
            TaskListAction::Select { id, additive } => {
                if additive {
                    self.selection.toggle(id);
                } else {
                    self.selection.select_only(id);
                }
            }
            TaskListAction::Delete(id) => self.delete_task(id),
            TaskListAction::Add => self.open_add_task(None),
            TaskListAction::None => {}
        }
        self.handle_inspector(inspector_action);

        let calendar_frame = egui::Frame::default()
            .fill(ui::theme::BG_CANVAS)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(calendar_frame)
            .show(ctx, |ui| {
                ui::calendar_view::show_calendar(
                    &self.project,
                    &mut self.gesture,
                    &self.selection,
                    &self.filter,
                    &self.settings,
                    &mut self.scroll_to,
                    ui,
                )
            })
            .inner;
        self.handle_calendar(interaction);

        if self.show_add_task {
            ui::dialogs::show_add_task_dialog(self, ctx);
        }
        if self.show_create_group {
            ui::dialogs::show_create_group_dialog(self, ctx);
        }
        if self.show_add_unit {
            ui::dialogs::show_add_unit_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
