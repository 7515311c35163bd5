use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_CANVAS: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_WEEKEND: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 5);
pub const BG_OUTSIDE_RANGE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 60);
pub const BG_TODAY: Color32 = Color32::from_rgba_premultiplied(240, 75, 75, 28);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);
pub const GROUP_OUTLINE: Color32 = Color32::from_rgb(255, 193, 7);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);
pub const TEXT_ERROR: Color32 = Color32::from_rgb(240, 110, 110);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_MARK: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);

/// Bar fill for tasks with no executing unit.
pub const UNASSIGNED_BAR: Color32 = Color32::from_rgb(96, 104, 128);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const DAY_LABEL_HEIGHT: f32 = 18.0;
pub const WEEKDAY_HEADER_HEIGHT: f32 = 26.0;
pub const LANE_HEIGHT: f32 = 20.0;
pub const LANE_GAP: f32 = 2.0;
pub const HANDLE_WIDTH: f32 = 6.0;
pub const BAR_ROUNDING: f32 = 4.0;
pub const BAR_INSET: f32 = 2.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_day() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.0)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Unit color palette ───────────────────────────────────────────────────────

pub const UNIT_COLORS: &[Color32] = &[
    Color32::from_rgb(66, 133, 244),
    Color32::from_rgb(52, 168, 83),
    Color32::from_rgb(171, 71, 188),
    Color32::from_rgb(251, 140, 0),
    Color32::from_rgb(3, 169, 244),
    Color32::from_rgb(229, 57, 53),
    Color32::from_rgb(0, 188, 212),
    Color32::from_rgb(255, 193, 7),
];

/// Palette color for the `n`th executing unit.
pub fn unit_color(n: usize) -> Color32 {
    UNIT_COLORS[n % UNIT_COLORS.len()]
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 28);
    visuals.faint_bg_color = BG_PANEL;
    visuals.striped = false;

    let rounding = Rounding::same(4.0);
    let widgets = &mut visuals.widgets;
    for (state, fill, stroke) in [
        (&mut widgets.noninteractive, BG_PANEL, BORDER_SUBTLE),
        (&mut widgets.inactive, Color32::from_rgb(42, 44, 56), BORDER_SUBTLE),
        (&mut widgets.hovered, Color32::from_rgb(52, 54, 68), ACCENT),
        (&mut widgets.active, Color32::from_rgb(60, 62, 76), ACCENT),
        (&mut widgets.open, Color32::from_rgb(50, 52, 66), ACCENT),
    ] {
        state.bg_fill = fill;
        state.bg_stroke = Stroke::new(1.0, stroke);
        state.rounding = rounding;
    }
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}

/// Register the phosphor icon font alongside egui's defaults.
pub fn install_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
    ctx.set_fonts(fonts);
}
