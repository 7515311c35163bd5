use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use egui::{Align, Align2, Color32, CursorIcon, Key, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

use crate::io::AppSettings;
use crate::model::grid::{self, CellMetrics, WeekSpan, DAYS_PER_WEEK};
use crate::model::lanes::{pack_lanes, tasks_in_week, LaneItem};
use crate::model::{DragHandle, DragKind, DragOutcome, Gesture, Project, Schedule, Selection, TaskFilter};
use crate::ui::theme;

const COLUMNS: usize = DAYS_PER_WEEK as usize;

/// What the calendar asks the app to do after this frame.
#[derive(Debug, Default)]
pub struct CalendarInteraction {
    /// A drag or inline rename produced a new schedule.
    pub committed: Option<Schedule>,
    /// A task was clicked; the flag is set when the selection should grow.
    pub clicked: Option<(Uuid, bool)>,
    pub cleared_selection: bool,
    /// Empty day double-clicked.
    pub add_on: Option<NaiveDate>,
    pub error: Option<String>,
}

/// Where one task segment was painted this frame.
struct BarHit {
    task_id: Uuid,
    rect: Rect,
    span: WeekSpan,
}

impl BarHit {
    /// Edges only resize where the task really starts or ends.
    fn kind_at(&self, pos: Pos2) -> DragKind {
        if !self.span.clipped_start && pos.x <= self.rect.left() + theme::HANDLE_WIDTH {
            DragKind::ResizeStart
        } else if !self.span.clipped_end && pos.x >= self.rect.right() - theme::HANDLE_WIDTH {
            DragKind::ResizeEnd
        } else {
            DragKind::Move
        }
    }
}

#[derive(Clone, Copy)]
struct PointerFrame {
    pos: Option<Pos2>,
    pressed: bool,
    down: bool,
    released: bool,
    additive: bool,
}

/// Render the week-row calendar and route pointer input through `gesture`.
pub fn show_calendar(
    project: &Project,
    gesture: &mut Gesture,
    selection: &Selection,
    filter: &TaskFilter,
    settings: &AppSettings,
    scroll_to: &mut Option<NaiveDate>,
    ui: &mut Ui,
) -> CalendarInteraction {
    let mut interaction = CalendarInteraction::default();
    let (range_start, range_end) = project.visible_range();
    let weeks = grid::weeks_in_range(range_start, range_end, settings.week_start);
    let column_width = (ui.available_width() / COLUMNS as f32).max(settings.min_column_width);
    let metrics = CellMetrics {
        column_width,
        row_height: settings.row_height,
    };

    // While a drag is past its threshold, draw its working copy.
    let working = gesture.working().cloned();
    let shown = working.as_ref().unwrap_or(&project.schedule);

    let selected_groups: HashSet<Uuid> = selection
        .ids()
        .iter()
        .filter_map(|id| project.schedule.task(*id).and_then(|t| t.group_id))
        .collect();

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let size = Vec2::new(
                column_width * COLUMNS as f32,
                theme::WEEKDAY_HEADER_HEIGHT + metrics.row_height * weeks.len() as f32,
            );
            let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
            painter.rect_filled(response.rect, 0.0, theme::BG_CANVAS);

            draw_weekday_header(&painter, response.rect.min, column_width, settings);
            let origin = response.rect.min + Vec2::new(0.0, theme::WEEKDAY_HEADER_HEIGHT);
            let today = chrono::Local::now().date_naive();

            let mut hits: Vec<BarHit> = Vec::new();
            for (row, anchor) in weeks.iter().enumerate() {
                let row_rect = Rect::from_min_size(
                    origin + Vec2::new(0.0, row as f32 * metrics.row_height),
                    Vec2::new(column_width * COLUMNS as f32, metrics.row_height),
                );

                if let Some(target) = *scroll_to {
                    if grid::week_start_of(target, settings.week_start) == *anchor {
                        ui.scroll_to_rect(row_rect, Some(Align::TOP));
                        *scroll_to = None;
                    }
                }
                if !ui.is_rect_visible(row_rect) {
                    continue;
                }

                draw_week_cells(&painter, row_rect, *anchor, column_width, today, (range_start, range_end));

                let week_tasks = tasks_in_week(shown.tasks(), *anchor, filter);
                let lanes = pack_lanes(&week_tasks, *anchor);
                let lane_room = ((metrics.row_height - theme::DAY_LABEL_HEIGHT)
                    / (theme::LANE_HEIGHT + theme::LANE_GAP))
                    .floor()
                    .max(0.0) as usize;
                let visible_lanes = lanes.len().min(settings.max_visible_lanes).min(lane_room);

                for (lane_idx, lane) in lanes.iter().take(visible_lanes).enumerate() {
                    for item in lane {
                        let rect = bar_rect(row_rect, item.span, lane_idx, column_width);
                        let moving = gesture
                            .drag()
                            .is_some_and(|h| h.is_dragging() && h.moves(item.task.id));
                        let linked = item.task.group_id.is_some_and(|g| selected_groups.contains(&g));
                        draw_task_bar(
                            &painter,
                            rect,
                            item,
                            bar_color(project, item.task.executing_unit_id),
                            selection.contains(item.task.id),
                            linked,
                            moving,
                        );
                        hits.push(BarHit {
                            task_id: item.task.id,
                            rect,
                            span: item.span,
                        });
                    }
                }

                let mut hidden = [0usize; COLUMNS];
                for item in lanes.iter().skip(visible_lanes).flatten() {
                    for col in item.span.start_col..=item.span.end_col {
                        hidden[col] += 1;
                    }
                }
                draw_overflow(&painter, row_rect, column_width, &hidden);
            }

            handle_inline_edit(project, gesture, &hits, ui, &mut interaction);

            let pointer = ui.input(|i| PointerFrame {
                pos: i.pointer.interact_pos(),
                pressed: i.pointer.primary_pressed(),
                down: i.pointer.primary_down(),
                released: i.pointer.primary_released(),
                additive: i.modifiers.command || i.modifiers.shift,
            });
            let hovered = response
                .hover_pos()
                .and_then(|pos| hits.iter().rev().find(|h| h.rect.contains(pos)).map(|h| (h, pos)));

            // ── Pointer-down: start a gesture on the bar under the pointer ──
            if pointer.pressed && gesture.edit().is_none() {
                if let Some((hit, pos)) = hovered {
                    match DragHandle::begin(hit.task_id, hit.kind_at(pos), pos, metrics, &project.schedule) {
                        Ok(handle) => gesture.begin_drag(handle.with_threshold(settings.drag_threshold_px)),
                        Err(e) => interaction.error = Some(e.to_string()),
                    }
                }
            }

            if let Some(pos) = pointer.pos.filter(|_| pointer.down) {
                gesture.update_drag(pos);
            }

            if let Some(handle) = gesture.drag().filter(|h| h.is_dragging()) {
                ui.ctx().set_cursor_icon(match handle.kind() {
                    DragKind::Move => CursorIcon::Grabbing,
                    DragKind::ResizeStart | DragKind::ResizeEnd => CursorIcon::ResizeHorizontal,
                });
                if let Some(pos) = pointer.pos {
                    draw_offset_badge(&painter, pos, handle.offset_days());
                }
            } else if let Some((hit, pos)) = hovered {
                ui.ctx().set_cursor_icon(match hit.kind_at(pos) {
                    DragKind::Move => CursorIcon::Grab,
                    _ => CursorIcon::ResizeHorizontal,
                });
                if gesture.is_idle() {
                    show_task_tooltip(project, hit.task_id, ui);
                }
            }

            // ── Pointer-up: commit or treat as a click ──
            if pointer.released {
                match gesture.finish_drag() {
                    Some(DragOutcome::Committed(next)) => interaction.committed = Some(next),
                    Some(DragOutcome::Click(id)) => interaction.clicked = Some((id, pointer.additive)),
                    None => {}
                }
            }

            if response.double_clicked() {
                match hovered {
                    Some((hit, _)) => {
                        if let Some(task) = project.schedule.task(hit.task_id) {
                            gesture.begin_edit(task);
                        }
                    }
                    None => {
                        interaction.add_on = response
                            .interact_pointer_pos()
                            .and_then(|pos| grid::cell_at(origin, pos, metrics, &weeks));
                    }
                }
            } else if response.clicked() && hovered.is_none() && gesture.edit().is_none() {
                interaction.cleared_selection = true;
            }
        });

    interaction
}

/// Overlay a text field on the bar being renamed; commit when it loses focus.
fn handle_inline_edit(
    project: &Project,
    gesture: &mut Gesture,
    hits: &[BarHit],
    ui: &mut Ui,
    interaction: &mut CalendarInteraction,
) {
    let target = gesture
        .edit()
        .and_then(|draft| hits.iter().find(|h| h.task_id == draft.task_id))
        .map(|h| h.rect);
    let (Some(rect), Some(draft)) = (target, gesture.edit_mut()) else {
        return;
    };

    let edit = ui.put(
        rect,
        egui::TextEdit::singleline(&mut draft.name)
            .font(theme::font_bar())
            .margin(Vec2::new(4.0, 1.0)),
    );
    if !edit.has_focus() && !edit.lost_focus() {
        edit.request_focus();
    }
    if !edit.lost_focus() {
        return;
    }

    if ui.input(|i| i.key_pressed(Key::Escape)) {
        gesture.cancel_edit();
        return;
    }
    match gesture.commit_edit(&project.schedule) {
        Ok(Some(next)) => interaction.committed = Some(next),
        Ok(None) => {}
        Err(e) => interaction.error = Some(e.to_string()),
    }
}

fn bar_rect(row_rect: Rect, span: WeekSpan, lane: usize, column_width: f32) -> Rect {
    let left = row_rect.left() + span.start_col as f32 * column_width + theme::BAR_INSET;
    let right = row_rect.left() + (span.end_col + 1) as f32 * column_width - theme::BAR_INSET;
    let top = row_rect.top() + theme::DAY_LABEL_HEIGHT + lane as f32 * (theme::LANE_HEIGHT + theme::LANE_GAP);
    Rect::from_min_max(Pos2::new(left, top), Pos2::new(right, top + theme::LANE_HEIGHT))
}

fn bar_color(project: &Project, unit: Option<Uuid>) -> Color32 {
    unit.and_then(|id| project.unit(id))
        .map(|u| u.color)
        .unwrap_or(theme::UNASSIGNED_BAR)
}

fn draw_weekday_header(painter: &egui::Painter, origin: Pos2, column_width: f32, settings: &AppSettings) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(column_width * COLUMNS as f32, theme::WEEKDAY_HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    let mut day = settings.week_start.weekday();
    for col in 0..COLUMNS {
        painter.text(
            Pos2::new(
                origin.x + (col as f32 + 0.5) * column_width,
                origin.y + theme::WEEKDAY_HEADER_HEIGHT / 2.0,
            ),
            Align2::CENTER_CENTER,
            format!("{day}"),
            theme::font_header(),
            theme::TEXT_SECONDARY,
        );
        day = day.succ();
    }
}

fn draw_week_cells(
    painter: &egui::Painter,
    row_rect: Rect,
    anchor: NaiveDate,
    column_width: f32,
    today: NaiveDate,
    (range_start, range_end): (NaiveDate, NaiveDate),
) {
    for col in 0..COLUMNS {
        let date = grid::date_at(anchor, col);
        let cell = Rect::from_min_size(
            Pos2::new(row_rect.left() + col as f32 * column_width, row_rect.top()),
            Vec2::new(column_width, row_rect.height()),
        );

        if date.weekday().num_days_from_monday() >= 5 {
            painter.rect_filled(cell, 0.0, theme::BG_WEEKEND);
        }
        if date < range_start || date > range_end {
            painter.rect_filled(cell, 0.0, theme::BG_OUTSIDE_RANGE);
        }
        if date == today {
            painter.rect_filled(cell, 0.0, theme::BG_TODAY);
        }
        painter.rect_stroke(cell, 0.0, Stroke::new(0.5, theme::GRID_LINE));

        let (label, color) = if date.day() == 1 {
            (date.format("%-d %b").to_string(), theme::TEXT_PRIMARY)
        } else if date == today {
            (date.format("%-d").to_string(), theme::TODAY_MARK)
        } else {
            (date.format("%-d").to_string(), theme::TEXT_SECONDARY)
        };
        painter.text(
            Pos2::new(cell.left() + 4.0, cell.top() + theme::DAY_LABEL_HEIGHT / 2.0),
            Align2::LEFT_CENTER,
            label,
            theme::font_day(),
            color,
        );
    }
}

fn draw_task_bar(
    painter: &egui::Painter,
    rect: Rect,
    item: &LaneItem<'_>,
    fill: Color32,
    selected: bool,
    linked: bool,
    moving: bool,
) {
    let r = theme::BAR_ROUNDING;
    // Square off edges that continue into the neighbouring week.
    let rounding = Rounding {
        nw: if item.span.clipped_start { 0.0 } else { r },
        sw: if item.span.clipped_start { 0.0 } else { r },
        ne: if item.span.clipped_end { 0.0 } else { r },
        se: if item.span.clipped_end { 0.0 } else { r },
    };

    painter.rect_filled(rect.translate(Vec2::new(1.0, 1.5)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(rect, rounding, if moving { fill.gamma_multiply(0.8) } else { fill });

    if linked {
        painter.rect_stroke(rect.expand(1.0), rounding, Stroke::new(1.5, theme::GROUP_OUTLINE));
    }
    if selected {
        painter.rect_stroke(rect.expand(1.5), rounding, Stroke::new(2.0, theme::BORDER_ACCENT));
    }

    let label = match item.task.group_id {
        Some(_) => format!("{} {}", egui_phosphor::regular::LINK, item.task.name),
        None => item.task.name.clone(),
    };
    let galley = painter.layout_no_wrap(label, theme::font_bar(), theme::TEXT_ON_BAR);
    let text_y = rect.top() + (rect.height() - galley.size().y) / 2.0;
    painter.with_clip_rect(rect.shrink(2.0)).galley(
        Pos2::new(rect.left() + 6.0, text_y),
        galley,
        Color32::TRANSPARENT,
    );

    if selected {
        let handle_h = rect.height() * 0.55;
        let y = rect.center().y - handle_h / 2.0;
        if !item.span.clipped_start {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(rect.left() + 1.0, y), Vec2::new(3.0, handle_h)),
                Rounding::same(1.5),
                theme::HANDLE_COLOR,
            );
        }
        if !item.span.clipped_end {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(rect.right() - 4.0, y), Vec2::new(3.0, handle_h)),
                Rounding::same(1.5),
                theme::HANDLE_COLOR,
            );
        }
    }
}

fn draw_overflow(painter: &egui::Painter, row_rect: Rect, column_width: f32, hidden: &[usize; COLUMNS]) {
    for (col, count) in hidden.iter().enumerate().filter(|(_, n)| **n > 0) {
        painter.text(
            Pos2::new(
                row_rect.left() + (col + 1) as f32 * column_width - 4.0,
                row_rect.top() + theme::DAY_LABEL_HEIGHT / 2.0,
            ),
            Align2::RIGHT_CENTER,
            format!("+{count} more"),
            theme::font_small(),
            theme::TEXT_DIM,
        );
    }
}

fn draw_offset_badge(painter: &egui::Painter, pointer: Pos2, days: i64) {
    let galley = painter.layout_no_wrap(offset_label(days), theme::font_small(), Color32::WHITE);
    let rect = Rect::from_min_size(
        pointer + Vec2::new(14.0, -22.0),
        galley.size() + Vec2::new(12.0, 4.0),
    );
    painter.rect_filled(rect, Rounding::same(6.0), theme::ACCENT);
    painter.galley(rect.min + Vec2::new(6.0, 2.0), galley, Color32::WHITE);
}

fn show_task_tooltip(project: &Project, task_id: Uuid, ui: &Ui) {
    let Some(task) = project.schedule.task(task_id) else {
        return;
    };
    egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), egui::Id::new(("task-tip", task_id)), |ui| {
        ui.strong(&task.name);
        ui.label(format!(
            "{} → {}",
            task.start_date.format("%d/%m/%Y"),
            task.end_date.format("%d/%m/%Y"),
        ));
        if let Some(unit) = task.executing_unit_id.and_then(|id| project.unit(id)) {
            ui.label(format!("Unit: {}", unit.name));
        }
        if let Some(group) = task.group_id.and_then(|id| project.schedule.group(id)) {
            ui.label(format!("{} {}", egui_phosphor::regular::LINK, group.name));
        }
    });
}

/// Human label for a drag offset, e.g. "+3 days".
pub fn offset_label(days: i64) -> String {
    match days {
        0 => "no change".to_string(),
        1 | -1 => format!("{days:+} day"),
        _ => format!("{days:+} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_labels() {
        assert_eq!(offset_label(0), "no change");
        assert_eq!(offset_label(1), "+1 day");
        assert_eq!(offset_label(-8), "-8 days");
    }

    #[test]
    fn edge_grabs_resize_only_on_real_ends() {
        let rect = Rect::from_min_max(Pos2::new(100.0, 0.0), Pos2::new(300.0, 20.0));
        let span = WeekSpan {
            start_col: 1,
            end_col: 2,
            clipped_start: false,
            clipped_end: true,
        };
        let hit = BarHit {
            task_id: Uuid::new_v4(),
            rect,
            span,
        };
        assert_eq!(hit.kind_at(Pos2::new(102.0, 10.0)), DragKind::ResizeStart);
        assert_eq!(hit.kind_at(Pos2::new(200.0, 10.0)), DragKind::Move);
        // Clipped right edge: the task continues next week.
        assert_eq!(hit.kind_at(Pos2::new(298.0, 10.0)), DragKind::Move);
    }
}
