use egui::{Color32, Id, RichText, Ui};
use egui_phosphor::regular as icons;
use uuid::Uuid;

use crate::model::{Command, Project, Selection, Task, TaskEdit, TaskGroup};
use crate::ui::theme;

/// Actions the inspector can request.
pub enum InspectorAction {
    None,
    Edit(Uuid, TaskEdit),
    Unlink { task_id: Uuid, group_id: Uuid },
    Run(Command),
    /// Scroll the calendar to this task.
    Reveal(Uuid),
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Details of the selection: an editor for the primary task, its group chain
/// and the commands that apply to several selected tasks.
pub fn show_inspector(project: &Project, selection: &Selection, ui: &mut Ui) -> InspectorAction {
    let mut action = InspectorAction::None;

    let Some(task) = selection.primary().and_then(|id| project.schedule.task(id)) else {
        ui.add_space(6.0);
        ui.label(
            RichText::new("Click a task to inspect it. Ctrl+click selects several.")
                .size(10.5)
                .color(theme::TEXT_DIM),
        );
        return action;
    };

    if selection.len() > 1 {
        show_bulk_commands(project, selection, ui, &mut action);
        ui.add_space(4.0);
        ui.separator();
    }

    ui.add_space(6.0);
    ui.label(RichText::new("Task").strong().size(13.0).color(theme::TEXT_PRIMARY));
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_CANVAS,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };
    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;
        show_task_fields(project, task, ui, &mut action);

        if let Some(group) = task.group_id.and_then(|id| project.schedule.group(id)) {
            ui.separator();
            show_group_chain(project, task, group, ui, &mut action);
        }
    });

    action
}

fn show_task_fields(project: &Project, task: &Task, ui: &mut Ui, action: &mut InspectorAction) {
    field_label(ui, "Name");
    // Keystrokes go to a draft; the task is renamed once, when the field
    // loses focus.
    let draft_id = Id::new(("inspector-name", task.id));
    let mut name: String = ui
        .ctx()
        .data_mut(|d| d.get_temp(draft_id))
        .unwrap_or_else(|| task.name.clone());
    let resp = ui.add_sized(
        [ui.available_width(), 24.0],
        egui::TextEdit::singleline(&mut name).font(egui::FontId::proportional(12.0)),
    );
    if resp.lost_focus() {
        ui.ctx().data_mut(|d| d.remove::<String>(draft_id));
        let escaped = ui.input(|i| i.key_pressed(egui::Key::Escape));
        if let Some(edit) = rename_edit(task, &name).filter(|_| !escaped) {
            *action = InspectorAction::Edit(task.id, edit);
        }
    } else if resp.has_focus() {
        ui.ctx().data_mut(|d| d.insert_temp(draft_id, name));
    }

    let mut start = task.start_date;
    let mut end = task.end_date;
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            field_label(ui, "Start");
            if ui
                .add(egui_extras::DatePickerButton::new(&mut start).id_salt("inspector_start"))
                .changed()
            {
                *action = InspectorAction::Edit(
                    task.id,
                    TaskEdit {
                        start_date: Some(start),
                        ..Default::default()
                    },
                );
            }
        });
        ui.add_space(8.0);
        ui.vertical(|ui| {
            field_label(ui, "End");
            if ui
                .add(egui_extras::DatePickerButton::new(&mut end).id_salt("inspector_end"))
                .changed()
            {
                *action = InspectorAction::Edit(
                    task.id,
                    TaskEdit {
                        end_date: Some(end),
                        ..Default::default()
                    },
                );
            }
        });
    });
    let days = task.duration_days();
    ui.label(
        RichText::new(format!("{days} day{}", if days == 1 { "" } else { "s" }))
            .size(10.0)
            .color(theme::TEXT_SECONDARY),
    );

    field_label(ui, "Executing unit");
    if let Some(unit) = unit_picker(project, task.executing_unit_id, ("inspector_unit", task.id), ui) {
        *action = InspectorAction::Edit(
            task.id,
            TaskEdit {
                executing_unit_id: Some(unit),
                ..Default::default()
            },
        );
    }

    if ui
        .button(RichText::new(format!("{}  Show in calendar", icons::CROSSHAIR)).size(11.0))
        .clicked()
    {
        *action = InspectorAction::Reveal(task.id);
    }
}

fn show_group_chain(project: &Project, task: &Task, group: &TaskGroup, ui: &mut Ui, action: &mut InspectorAction) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(icons::LINK).color(theme::GROUP_OUTLINE));
        ui.label(RichText::new(&group.name).strong().size(12.0));
        ui.label(
            RichText::new(format!("({} tasks)", group.len()))
                .size(10.0)
                .color(theme::TEXT_DIM),
        );
    });

    for (i, member_id) in group.task_ids.iter().enumerate() {
        let name = project
            .schedule
            .task(*member_id)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        let text = RichText::new(format!("{}. {name}", i + 1)).size(11.0);
        let text = if *member_id == task.id {
            text.color(Color32::WHITE).strong()
        } else {
            text.color(theme::TEXT_SECONDARY)
        };
        if ui.selectable_label(false, text).clicked() {
            *action = InspectorAction::Reveal(*member_id);
        }
        if let Some(gap) = group.intervals.get(i) {
            ui.label(
                RichText::new(format!("   {} {gap} day{} gap", icons::ARROW_DOWN, if *gap == 1 { "" } else { "s" }))
                    .size(9.5)
                    .color(theme::TEXT_DIM),
            );
        }
    }

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui
            .button(RichText::new(format!("{}  Unlink", icons::LINK_BREAK)).size(11.0))
            .on_hover_text("Remove this task from the group")
            .clicked()
        {
            *action = InspectorAction::Unlink {
                task_id: task.id,
                group_id: group.id,
            };
        }
        if ui
            .button(RichText::new(format!("{}  Delete group", icons::TRASH)).size(11.0))
            .on_hover_text("Dissolve the group; its tasks stay")
            .clicked()
        {
            *action = InspectorAction::Run(Command::DeleteGroup(group.id));
        }
    });
}

fn show_bulk_commands(project: &Project, selection: &Selection, ui: &mut Ui, action: &mut InspectorAction) {
    ui.add_space(6.0);
    ui.label(
        RichText::new(format!("{} tasks selected", selection.len()))
            .strong()
            .size(13.0),
    );
    ui.add_space(2.0);

    let name_id = Id::new("bulk-group-name");
    let mut name: String = ui.ctx().data_mut(|d| d.get_temp(name_id).unwrap_or_default());
    field_label(ui, "New group");
    ui.horizontal(|ui| {
        let width = (ui.available_width() - 90.0).max(60.0);
        ui.add_sized([width, 22.0], egui::TextEdit::singleline(&mut name).hint_text("Group name"));
        let btn = egui::Button::new(RichText::new(format!("{}  Link", icons::LINK)).color(Color32::WHITE))
            .fill(theme::ACCENT);
        if ui.add(btn).clicked() {
            *action = InspectorAction::Run(Command::CreateGroup {
                name: std::mem::take(&mut name),
            });
        }
    });
    ui.ctx().data_mut(|d| d.insert_temp(name_id, name));

    field_label(ui, "Assign unit");
    let current = selection
        .primary()
        .and_then(|id| project.schedule.task(id))
        .and_then(|t| t.executing_unit_id);
    if let Some(unit) = unit_picker(project, current, "bulk_unit", ui) {
        *action = InspectorAction::Run(Command::AssignUnit(unit));
    }

    let any_grouped = selection
        .ids()
        .iter()
        .any(|id| project.schedule.task(*id).is_some_and(|t| t.group_id.is_some()));
    ui.horizontal(|ui| {
        if ui
            .add_enabled(any_grouped, egui::Button::new(format!("{}  Unlink all", icons::LINK_BREAK)))
            .clicked()
        {
            *action = InspectorAction::Run(Command::Unlink);
        }
        if ui.button(format!("{}  Delete", icons::TRASH)).clicked() {
            *action = InspectorAction::Run(Command::DeleteTasks);
        }
    });
}

/// The edit a finished name draft asks for, if any.
fn rename_edit(task: &Task, draft: &str) -> Option<TaskEdit> {
    let name = draft.trim();
    (!name.is_empty() && name != task.name).then(|| TaskEdit {
        name: Some(name.to_string()),
        ..Default::default()
    })
}

/// Combo over the project's units. Returns the new choice when it changed.
fn unit_picker(project: &Project, current: Option<Uuid>, salt: impl std::hash::Hash, ui: &mut Ui) -> Option<Option<Uuid>> {
    let mut choice = current;
    let label = current
        .and_then(|id| project.unit(id))
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "— None —".to_string());

    egui::ComboBox::from_id_salt(salt)
        .selected_text(RichText::new(label).size(11.0))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut choice, None, "— None —");
            for unit in &project.executing_units {
                ui.horizontal(|ui| {
                    let (dot, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                    ui.painter().circle_filled(dot.center(), 4.0, unit.color);
                    ui.selectable_value(&mut choice, Some(unit.id), &unit.name);
                });
            }
        });

    (choice != current).then_some(choice)
}
