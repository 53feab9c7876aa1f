//! Pan/zoom state for the canvas.
//!
//! The view window is first fitted into the canvas (aspect preserved,
//! centered), then the user transform is applied around the canvas center:
//!
//! `screen = canvas_center + pan + zoom * fit * (flip(p) - window_center)`
//!
//! With `zoom == 1` and `pan == 0` the whole window is visible and centered,
//! which is what [`ViewTransport::reset`] restores.

use kurbo::{Affine, Point, Rect, Vec2};
use lwv_shared::domain::NetsRevision;

use crate::projector::ViewWindow;

pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 10_000.0;
/// Zoom change per unit of wheel delta, applied exponentially.
pub const WHEEL_ZOOM_RATE: f64 = 0.0015;

/// Zoom limits must be finite and strictly positive.
pub fn valid_zoom_limit(limit: f64) -> bool {
    limit.is_finite() && limit > 0.0
}

/// Pointer and gesture input the canvas forwards. Positions are canvas
/// pixels, y-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewInput {
    /// Pointer drag by a pixel delta.
    Drag(Vec2),
    /// Wheel scroll; positive `delta` zooms in around `anchor`.
    Wheel { delta: f64, anchor: Point },
    /// Multiplicative pinch gesture around `anchor`.
    Pinch { factor: f64, anchor: Point },
}

#[derive(Debug, Clone)]
pub struct ViewTransport {
    window: ViewWindow,
    zoom: f64,
    pan: Vec2,
    min_zoom: f64,
    max_zoom: f64,
    fitted_revision: Option<NetsRevision>,
}

impl Default for ViewTransport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

impl ViewTransport {
    /// Invalid limits leave the defaults in place.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        let mut transport = Self {
            window: ViewWindow::default(),
            zoom: 1.0,
            pan: Vec2::ZERO,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            fitted_revision: None,
        };
        transport.set_zoom_limits(min_zoom, max_zoom);
        transport
    }

    /// Normalizes the range so `min <= max` and re-clamps the current zoom.
    /// Returns false, keeping the current range, unless both limits are
    /// finite and positive.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) -> bool {
        if !valid_zoom_limit(min_zoom) || !valid_zoom_limit(max_zoom) {
            return false;
        }
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        true
    }

    pub fn zoom_limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    /// Fits the view to `window` whenever the nets revision moves. Returns
    /// whether a re-fit happened.
    pub fn sync_geometry(&mut self, revision: NetsRevision, window: ViewWindow) -> bool {
        if self.fitted_revision == Some(revision) {
            return false;
        }
        self.window = window;
        self.fitted_revision = Some(revision);
        self.reset();
        true
    }

    /// Whole window visible and centered. The default zoom sits outside the
    /// configured range only if the range excludes 1.
    pub fn reset(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        self.pan = Vec2::ZERO;
    }

    fn fit_scale(&self, canvas: Rect) -> f64 {
        let scale =
            (canvas.width() / self.window.width()).min(canvas.height() / self.window.height());
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Screen pixels per design unit.
    pub fn scale(&self, canvas: Rect) -> f64 {
        self.fit_scale(canvas) * self.zoom
    }

    /// Design space to canvas pixels: flip, center the window, scale, then
    /// pan about the canvas center.
    pub fn transform(&self, canvas: Rect) -> Affine {
        Affine::translate(canvas.center().to_vec2() + self.pan)
            * Affine::scale(self.scale(canvas))
            * Affine::translate(-self.window.center().to_vec2())
            * Affine::FLIP_Y
    }

    pub fn design_to_screen(&self, point: Point, canvas: Rect) -> Point {
        self.transform(canvas) * point
    }

    pub fn screen_to_design(&self, pos: Point, canvas: Rect) -> Point {
        self.transform(canvas).inverse() * pos
    }

    /// Converts a pixel distance (e.g. a pick radius) into design units.
    pub fn pixels_to_design(&self, pixels: f64, canvas: Rect) -> f64 {
        pixels / self.scale(canvas)
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.pan += delta;
        true
    }

    /// Multiplies the zoom by `factor` (clamped) keeping the design point under
    /// `anchor` fixed on screen.
    pub fn zoom_about(&mut self, factor: f64, anchor: Point, canvas: Rect) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if zoom == self.zoom {
            return false;
        }
        let under_anchor = self.screen_to_design(anchor, canvas);
        self.zoom = zoom;
        let moved = self.design_to_screen(under_anchor, canvas);
        self.pan += anchor - moved;
        true
    }

    /// Applies one input event. Returns whether the transform changed.
    pub fn apply(&mut self, input: ViewInput, canvas: Rect) -> bool {
        match input {
            ViewInput::Drag(delta) => self.pan_by(delta),
            ViewInput::Wheel { delta, anchor } => {
                self.zoom_about((delta * WHEEL_ZOOM_RATE).exp(), anchor, canvas)
            }
            ViewInput::Pinch { factor, anchor } => self.zoom_about(factor, anchor, canvas),
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
