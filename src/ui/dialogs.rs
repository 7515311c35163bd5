use crate::app::CalendarApp;
use crate::model::Command;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

const DIALOG_WIDTH: f32 = 320.0;

fn dialog_buttons(ui: &mut egui::Ui, confirm: &str) -> (bool, bool) {
    let mut confirmed = false;
    let mut cancelled = false;
    ui.add_space(6.0);
    ui.separator();
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let btn = egui::Button::new(RichText::new(confirm).color(Color32::WHITE))
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(4.0));
        confirmed = ui.add_sized([80.0, 28.0], btn).clicked();
        cancelled = ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked();
    });
    ui.add_space(2.0);
    (confirmed, cancelled)
}

fn escape_pressed(ctx: &Context) -> bool {
    ctx.input(|i| i.key_pressed(egui::Key::Escape))
}

/// Render the "Add Task" dialog.
pub fn show_add_task_dialog(app: &mut CalendarApp, ctx: &Context) {
    let mut should_close = false;
    Window::new(RichText::new("Add Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("add_task_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut app.new_task_name).hint_text("Task name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut app.new_task_start_date).id_salt("dlg_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut app.new_task_end_date).id_salt("dlg_dp_end"));
                    ui.end_row();

                    ui.label(RichText::new("Unit").color(theme::TEXT_SECONDARY));
                    let label = app
                        .new_task_unit
                        .and_then(|id| app.project.unit(id))
                        .map(|u| u.name.clone())
                        .unwrap_or_else(|| "— None —".to_string());
                    egui::ComboBox::from_id_salt("dlg_unit")
                        .selected_text(label)
                        .width(220.0)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut app.new_task_unit, None, "— None —");
                            for unit in &app.project.executing_units {
                                ui.selectable_value(&mut app.new_task_unit, Some(unit.id), &unit.name);
                            }
                        });
                    ui.end_row();
                });

            let (confirmed, cancelled) = dialog_buttons(ui, "Create");
            if confirmed {
                app.create_task_from_dialog();
            }
            should_close = confirmed || cancelled;
        });

    if should_close || escape_pressed(ctx) {
        app.show_add_task = false;
    }
}

/// Name a new group for the current selection.
pub fn show_create_group_dialog(app: &mut CalendarApp, ctx: &Context) {
    let mut should_close = false;
    Window::new(RichText::new("Link Tasks").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(
                RichText::new(format!(
                    "{} selected tasks will move together and keep their gaps.",
                    app.selection.len()
                ))
                .size(11.0)
                .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(4.0);
            let edit = ui.add_sized(
                [ui.available_width(), 24.0],
                egui::TextEdit::singleline(&mut app.new_group_name).hint_text("Group name (optional)"),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let (confirmed, cancelled) = dialog_buttons(ui, "Link");
            if confirmed || submitted {
                let name = std::mem::take(&mut app.new_group_name);
                app.run_command(Command::CreateGroup { name });
            }
            should_close = confirmed || submitted || cancelled;
        });

    if should_close || escape_pressed(ctx) {
        app.show_create_group = false;
    }
}

/// Register a new executing unit.
pub fn show_add_unit_dialog(app: &mut CalendarApp, ctx: &Context) {
    let mut should_close = false;
    Window::new(RichText::new("Add Executing Unit").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("add_unit_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [200.0, 24.0],
                        egui::TextEdit::singleline(&mut app.new_unit_name).hint_text("Crew, team, machine..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                    ui.color_edit_button_srgba(&mut app.new_unit_color);
                    ui.end_row();
                });

            let (confirmed, cancelled) = dialog_buttons(ui, "Add");
            if confirmed {
                app.create_unit_from_dialog();
            }
            should_close = confirmed || cancelled;
        });

    if should_close || escape_pressed(ctx) {
        app.show_add_unit = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut CalendarApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 220.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Rust Calendar App").strong());
                ui.add_space(2.0);
                ui.label(RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).color(theme::TEXT_SECONDARY));
                ui.add_space(10.0);
                ui.label("Plan tasks week by week and link them");
                ui.label("into groups that move as one.");
                ui.add_space(6.0);
                ui.label(
                    RichText::new("Drag a bar to move · drag an edge to resize · double-click to rename")
                        .size(10.0)
                        .color(theme::TEXT_DIM),
                );
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || escape_pressed(ctx) {
        app.show_about = false;
    }
}
