//! Standalone SVG export of a projected scene.

use std::fmt::Write as _;

use crate::projector::{Scene, ScenePath};

#[derive(Debug, Clone)]
pub struct SvgStyle {
    pub stroke: String,
    pub selected_stroke: String,
    pub stroke_width_px: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            stroke: "#007acc".to_string(),
            selected_stroke: "#00ff00".to_string(),
            stroke_width_px: 2.0,
        }
    }
}

/// `d` attribute for a path in design coordinates; the document flips y.
pub fn path_data(path: &ScenePath) -> String {
    path.path.to_svg()
}

pub fn render_svg(scene: &Scene, style: &SvgStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}">"#,
        scene.window.to_view_box()
    );
    out.push_str("  <g transform=\"scale(1, -1)\">\n");
    let mut current_net: Option<&str> = None;
    for path in scene.paths.iter().filter(|path| !path.is_empty()) {
        if current_net != Some(path.net.as_str()) {
            if current_net.is_some() {
                out.push_str("    </g>\n");
            }
            let _ = writeln!(out, "    <g data-net=\"{}\">", escape(&path.net));
            current_net = Some(path.net.as_str());
        }
        let stroke = if path.selected {
            &style.selected_stroke
        } else {
            &style.stroke
        };
        let _ = writeln!(
            out,
            r#"      <path d="{}" stroke="{}" stroke-width="{}px" fill="none" vector-effect="non-scaling-stroke"><title>{} (ID: {})</title></path>"#,
            path_data(path),
            escape(stroke),
            style.stroke_width_px,
            escape(&path.net),
            escape(&path.primitive_id.to_string()),
        );
    }
    if current_net.is_some() {
        out.push_str("    </g>\n");
    }
    out.push_str("  </g>\n</svg>\n");
    out
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
