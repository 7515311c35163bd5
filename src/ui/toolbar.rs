use crate::app::CalendarApp;
use crate::model::grid::months_in_range;
use crate::model::{Command, WeekStart};
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

fn menu_title(text: &str) -> RichText {
    RichText::new(format!("  {text}  ")).size(13.0)
}

/// Render the top menu bar.
pub fn show_toolbar(app: &mut CalendarApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(menu_title("File"), |ui| {
            if ui.button(format!("{}  New Project", icons::FILE_PLUS)).clicked() {
                app.new_project();
                ui.close_menu();
            }
            if ui.button(format!("{}  Open...", icons::FOLDER_OPEN)).clicked() {
                app.open_project();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Save          Ctrl+S", icons::FLOPPY_DISK)).clicked() {
                app.save_project();
                ui.close_menu();
            }
            if ui.button("     Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Export Markdown...", icons::EXPORT)).clicked() {
                app.export_markdown();
                ui.close_menu();
            }
            if ui.button(format!("{}  Export CSV...", icons::EXPORT)).clicked() {
                app.export_csv();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("Edit"), |ui| {
            if ui
                .add_enabled(app.history.can_undo(), egui::Button::new("  Undo          Ctrl+Z"))
                .clicked()
            {
                app.undo();
                ui.close_menu();
            }
            if ui
                .add_enabled(app.history.can_redo(), egui::Button::new("  Redo          Ctrl+Y"))
                .clicked()
            {
                app.redo();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Add Task...", icons::PLUS)).clicked() {
                app.open_add_task(None);
                ui.close_menu();
            }
            if ui.button(format!("{}  Add Unit...", icons::USERS)).clicked() {
                app.show_add_unit = true;
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(app.selection.len() >= 2, egui::Button::new(format!("{}  Link Selected...   Ctrl+G", icons::LINK)))
                .clicked()
            {
                app.show_create_group = true;
                ui.close_menu();
            }
            if ui
                .add_enabled(!app.selection.is_empty(), egui::Button::new(format!("{}  Unlink Selected", icons::LINK_BREAK)))
                .clicked()
            {
                app.run_command(Command::Unlink);
                ui.close_menu();
            }
            if ui
                .add_enabled(!app.selection.is_empty(), egui::Button::new(format!("{}  Delete Selected   Del", icons::TRASH)))
                .clicked()
            {
                app.run_command(Command::DeleteTasks);
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("View"), |ui| {
            if ui.button(format!("{}  Today", icons::CALENDAR_BLANK)).clicked() {
                app.scroll_to = Some(chrono::Local::now().date_naive());
                ui.close_menu();
            }
            let (start, end) = app.project.visible_range();
            ui.menu_button("  Go to Month", |ui| {
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    for month in months_in_range(start, end, app.settings.week_start) {
                        let Some(first) = month.first_day() else {
                            continue;
                        };
                        if ui.button(first.format("%B %Y").to_string()).clicked() {
                            app.scroll_to = Some(first);
                            ui.close_menu();
                        }
                    }
                });
            });
            ui.separator();
            ui.label(RichText::new("Week starts on").small().weak());
            let mut week_start = app.settings.week_start;
            ui.radio_value(&mut week_start, WeekStart::Monday, "Monday");
            ui.radio_value(&mut week_start, WeekStart::Sunday, "Sunday");
            if week_start != app.settings.week_start {
                app.set_week_start(week_start);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Settings Folder").clicked() {
                app.open_settings_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("Help"), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let unsaved = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.project.name, unsaved))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
