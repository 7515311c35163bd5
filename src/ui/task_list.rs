use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;
use uuid::Uuid;

use crate::model::group::chronological;
use crate::model::{Project, Selection, Task, TaskFilter};
use crate::ui::theme;

/// Actions that the task list can request.
pub enum TaskListAction {
    None,
    /// Row clicked; `additive` extends the selection instead of replacing it.
    Select { id: Uuid, additive: bool },
    Delete(Uuid),
    Add,
}

/// Render the left-side task list: filter bar plus one row per task, in
/// chronological order.
pub fn show_task_list(project: &Project, selection: &Selection, filter: &mut TaskFilter, ui: &mut Ui) -> TaskListAction {
    let mut action = TaskListAction::None;

    let mut tasks: Vec<&Task> = project.schedule.tasks().iter().filter(|t| filter.matches(t)).collect();
    chronological(&mut tasks);

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Tasks").strong().size(15.0).color(theme::TEXT_PRIMARY));
        ui.add_space(4.0);
        let count = if filter.is_active() {
            format!("({} of {})", tasks.len(), project.schedule.tasks().len())
        } else {
            format!("({})", tasks.len())
        };
        ui.label(RichText::new(count).size(11.0).color(theme::TEXT_DIM));
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(
        RichText::new(format!("{}  Add Task", icons::PLUS))
            .color(Color32::WHITE)
            .size(12.0),
    )
    .fill(theme::ACCENT)
    .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = TaskListAction::Add;
    }

    ui.add_space(6.0);
    show_filter_bar(project, filter, ui);
    ui.add_space(4.0);
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("task-list")
        .auto_shrink([false, false])
        .max_height(ui.available_height() * 0.5)
        .show(ui, |ui| {
            for (i, task) in tasks.iter().enumerate() {
                let is_selected = selection.contains(task.id);
                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_CANVAS
                };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin::ZERO,
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;

                        let color = task
                            .executing_unit_id
                            .and_then(|id| project.unit(id))
                            .map(|u| u.color)
                            .unwrap_or(theme::UNASSIGNED_BAR);
                        let (dot_rect, _) = ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot_rect.center(), 3.0, color);

                        if let Some(group) = task.group_id.and_then(|id| project.schedule.group(id)) {
                            ui.label(RichText::new(icons::LINK).size(11.0).color(theme::GROUP_OUTLINE))
                                .on_hover_text(&group.name);
                        }

                        let name = RichText::new(&task.name).size(12.0).color(if is_selected {
                            Color32::WHITE
                        } else {
                            theme::TEXT_PRIMARY
                        });
                        ui.add(egui::Label::new(name).truncate());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;
                            let del = ui.add(
                                egui::Button::new(RichText::new(icons::X).size(10.0).color(theme::TEXT_DIM))
                                    .frame(false),
                            );
                            if del.on_hover_text("Delete task").clicked() {
                                action = TaskListAction::Delete(task.id);
                            }
                            ui.label(
                                RichText::new(format!(
                                    "{} → {}",
                                    task.start_date.format("%m/%d"),
                                    task.end_date.format("%m/%d")
                                ))
                                .size(10.0)
                                .color(theme::TEXT_SECONDARY),
                            );
                        });
                    });
                });

                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("task-row", task.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() && matches!(action, TaskListAction::None) {
                    let additive = ui.input(|i| i.modifiers.command || i.modifiers.shift);
                    action = TaskListAction::Select { id: task.id, additive };
                }

                ui.add_space(1.0);
            }

            if tasks.is_empty() {
                ui.add_space(8.0);
                let hint = if filter.is_active() {
                    "No tasks match the filter."
                } else {
                    "No tasks yet. Double-click a day to add one."
                };
                ui.label(RichText::new(hint).size(10.5).color(theme::TEXT_DIM));
            }
        });

    action
}

fn show_filter_bar(project: &Project, filter: &mut TaskFilter, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(icons::MAGNIFYING_GLASS).color(theme::TEXT_DIM));
        ui.add(
            egui::TextEdit::singleline(&mut filter.query)
                .hint_text("Filter tasks")
                .desired_width(ui.available_width() - 24.0),
        );
        if filter.is_active()
            && ui
                .add(egui::Button::new(RichText::new(icons::X).size(10.0)).frame(false))
                .on_hover_text("Clear filter")
                .clicked()
        {
            *filter = TaskFilter::default();
        }
    });

    if project.executing_units.is_empty() {
        return;
    }
    let label = filter
        .executing_unit
        .and_then(|id| project.unit(id))
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "All units".to_string());
    egui::ComboBox::from_id_salt("filter_unit")
        .selected_text(RichText::new(label).size(11.0))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut filter.executing_unit, None, "All units");
            for unit in &project.executing_units {
                ui.selectable_value(&mut filter.executing_unit, Some(unit.id), &unit.name);
            }
        });
}
