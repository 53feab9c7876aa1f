//! Dark palette shared by every panel.

use eframe::egui::{self, Color32};

pub const ACCENT: Color32 = Color32::from_rgb(0, 122, 204);
pub const TRACE: Color32 = ACCENT;
pub const SELECTED_TRACE: Color32 = Color32::from_rgb(0, 255, 0);
pub const MEAN_WIDTH: Color32 = Color32::from_rgb(230, 160, 60);
pub const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(30, 30, 30);
pub const PANEL_BACKGROUND: Color32 = Color32::from_rgb(37, 37, 38);
pub const INPUT_BACKGROUND: Color32 = Color32::from_rgb(60, 60, 60);
pub const BORDER: Color32 = Color32::from_rgb(62, 62, 66);
pub const BANNER_FILL: Color32 = Color32::from_rgb(111, 53, 53);
pub const BANNER_STROKE: Color32 = Color32::from_rgb(175, 96, 96);

/// Trace strokes do not scale with zoom.
pub const TRACE_STROKE_PX: f32 = 2.0;
pub const SELECTED_STROKE_PX: f32 = 3.0;

pub fn visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = PANEL_BACKGROUND;
    visuals.panel_fill = PANEL_BACKGROUND;
    visuals.extreme_bg_color = INPUT_BACKGROUND;
    visuals.faint_bg_color = Color32::from_rgb(45, 45, 48);
    visuals.hyperlink_color = ACCENT;
    visuals.selection.bg_fill = ACCENT;
    visuals.window_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.hovered.bg_fill = ACCENT.gamma_multiply(0.85);
    visuals.window_corner_radius = egui::CornerRadius::same(6);
    visuals.menu_corner_radius = egui::CornerRadius::same(4);
    visuals
}
