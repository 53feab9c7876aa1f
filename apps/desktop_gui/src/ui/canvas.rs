//! Trace canvas: paints the scene through the view transport and turns
//! pointer input into pan, zoom and picks.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke};
use lwv_scene::{
    kurbo::{Point, Rect, Vec2},
    Scene, ScenePath, ViewInput, ViewTransport,
};
use lwv_shared::domain::PrimitiveId;

use crate::ui::theme;

pub fn canvas_rect(rect: egui::Rect) -> Rect {
    Rect::from_points(to_screen(rect.min), to_screen(rect.max))
}

fn to_pos2(pos: Point) -> Pos2 {
    Pos2::new(pos.x as f32, pos.y as f32)
}

fn to_screen(pos: Pos2) -> Point {
    Point::new(f64::from(pos.x), f64::from(pos.y))
}

/// Draws the canvas and returns the primitive clicked this frame, if any.
/// While `overlay` is set input is ignored and the label covers the canvas.
pub fn show_canvas(
    ui: &mut egui::Ui,
    scene: &Scene,
    view: &mut ViewTransport,
    pick_radius_px: f64,
    overlay: Option<&str>,
) -> Option<PrimitiveId> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let rect = response.rect;
    let canvas = canvas_rect(rect);
    painter.rect_filled(rect, 0.0, theme::CANVAS_BACKGROUND);

    if overlay.is_none() {
        if response.dragged() {
            let delta = response.drag_delta();
            let delta = Vec2::new(f64::from(delta.x), f64::from(delta.y));
            view.apply(ViewInput::Drag(delta), canvas);
        }
        if let Some(pointer) = response.hover_pos() {
            let anchor = to_screen(pointer);
            let (scroll, pinch) =
                ui.input(|input| (input.smooth_scroll_delta.y, input.zoom_delta()));
            if scroll != 0.0 {
                view.apply(
                    ViewInput::Wheel {
                        delta: f64::from(scroll),
                        anchor,
                    },
                    canvas,
                );
            }
            if pinch != 1.0 {
                view.apply(
                    ViewInput::Pinch {
                        factor: f64::from(pinch),
                        anchor,
                    },
                    canvas,
                );
            }
        }
    }

    let trace = Stroke::new(theme::TRACE_STROKE_PX, theme::TRACE);
    let selected = Stroke::new(theme::SELECTED_STROKE_PX, theme::SELECTED_TRACE);
    for path in scene.paths.iter().filter(|path| !path.selected) {
        paint_path(&painter, path, view, canvas, trace);
    }
    for path in scene.selected_paths() {
        paint_path(&painter, path, view, canvas, selected);
    }

    if let Some(label) = overlay {
        painter.rect_filled(rect, 0.0, Color32::from_black_alpha(160));
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(18.0),
            Color32::WHITE,
        );
        return None;
    }

    let tolerance = view.pixels_to_design(pick_radius_px, canvas);
    let hovered = response
        .hover_pos()
        .and_then(|pos| scene.pick(view.screen_to_design(to_screen(pos), canvas), tolerance));
    let response = match hovered {
        Some(path) => response.on_hover_text(format!("{} (ID: {})", path.net, path.primitive_id)),
        None => response,
    };
    if response.clicked() {
        return hovered.map(|path| path.primitive_id.clone());
    }
    None
}

fn paint_path(
    painter: &egui::Painter,
    path: &ScenePath,
    view: &ViewTransport,
    canvas: Rect,
    stroke: Stroke,
) {
    for run in path.subpaths() {
        let points: Vec<Pos2> = run
            .iter()
            .map(|point| to_pos2(view.design_to_screen(*point, canvas)))
            .collect();
        if points.len() == 1 {
            painter.circle_filled(points[0], stroke.width / 2.0, stroke.color);
        } else {
            painter.add(Shape::line(points, stroke));
        }
    }
}
