//! Derives a renderable scene from a net collection and the current selection.
//!
//! Geometry stays in design space (y-up). The window is expressed in render
//! space (y-down), i.e. after the single global flip `(x, y) -> (x, -y)` that
//! the renderer applies to every point.

use kurbo::{Affine, BezPath, Line, ParamCurveNearest, PathEl, PathSeg, Point, Rect};
use lwv_shared::{
    domain::PrimitiveId,
    geometry::{self, Net, Primitive},
};

/// Bounds used when there is no drawable point at all.
pub const DEFAULT_BOUNDS: Rect = Rect::new(0.0, 0.0, 0.1, 0.1);
pub const PADDING_FRACTION: f64 = 0.1;
/// Pad applied on an axis whose extent is zero.
pub const MIN_PADDING: f64 = 0.01;
const NEAREST_ACCURACY: f64 = 1e-9;

pub fn design_point(point: geometry::Point) -> Point {
    Point::new(point.x, point.y)
}

/// The global y-flip from design space to render space.
pub fn to_render_space(point: Point) -> Point {
    Affine::FLIP_Y * point
}

/// Visible region in render space, shaped like an SVG `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow(Rect);

impl ViewWindow {
    /// Pads `bounds` and flips it into render space. Width and height of the
    /// result are always strictly positive.
    pub fn from_bounds(bounds: Rect) -> Self {
        let padded = bounds.inflate(
            axis_padding(bounds.width()),
            axis_padding(bounds.height()),
        );
        Self(Affine::FLIP_Y.transform_rect_bbox(padded))
    }

    pub fn rect(&self) -> Rect {
        self.0
    }

    pub fn width(&self) -> f64 {
        self.0.width()
    }

    pub fn height(&self) -> f64 {
        self.0.height()
    }

    pub fn center(&self) -> Point {
        self.0.center()
    }

    /// Whether a design-space point falls inside the window once flipped.
    pub fn contains_design(&self, point: Point) -> bool {
        self.0.contains(to_render_space(point))
    }

    pub fn to_view_box(&self) -> String {
        format!(
            "{} {} {} {}",
            self.0.x0,
            self.0.y0,
            self.0.width(),
            self.0.height()
        )
    }
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self::from_bounds(DEFAULT_BOUNDS)
    }
}

fn axis_padding(extent: f64) -> f64 {
    let pad = extent * PADDING_FRACTION;
    if pad > 0.0 {
        pad
    } else {
        MIN_PADDING
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePath {
    pub net: String,
    pub primitive_id: PrimitiveId,
    pub layer: String,
    pub width: f64,
    /// Design-space outline; each sentinel run starts with a `MoveTo`.
    pub path: BezPath,
    pub selected: bool,
}

impl ScenePath {
    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    /// Every drawn segment, in path order. Nothing connects across a `MoveTo`.
    pub fn segments(&self) -> impl Iterator<Item = Line> + '_ {
        self.path.segments().filter_map(|segment| match segment {
            PathSeg::Line(line) => Some(line),
            _ => None,
        })
    }

    /// Point runs between `MoveTo` elements.
    pub fn subpaths(&self) -> Vec<Vec<Point>> {
        let mut runs: Vec<Vec<Point>> = Vec::new();
        for element in self.path.elements() {
            match *element {
                PathEl::MoveTo(point) => runs.push(vec![point]),
                PathEl::LineTo(point) => {
                    if let Some(run) = runs.last_mut() {
                        run.push(point);
                    }
                }
                _ => {}
            }
        }
        runs
    }

    fn distance_to(&self, point: Point) -> Option<f64> {
        let mut best: Option<f64> = None;
        for run in self.subpaths() {
            let nearest = match run.as_slice() {
                [single] => point.distance(*single),
                _ => run
                    .windows(2)
                    .map(|pair| {
                        Line::new(pair[0], pair[1])
                            .nearest(point, NEAREST_ACCURACY)
                            .distance_sq
                            .sqrt()
                    })
                    .fold(f64::INFINITY, f64::min),
            };
            best = Some(best.map_or(nearest, |current| current.min(nearest)));
        }
        best
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Tight bounds of the drawable geometry, `None` when there is none.
    pub bounds: Option<Rect>,
    pub window: ViewWindow,
    pub paths: Vec<ScenePath>,
}

impl Scene {
    pub fn selected_paths(&self) -> impl Iterator<Item = &ScenePath> + '_ {
        self.paths.iter().filter(|path| path.selected)
    }

    /// Nearest path within `tolerance` design units of `point`.
    pub fn pick(&self, point: Point, tolerance: f64) -> Option<&ScenePath> {
        self.paths
            .iter()
            .filter_map(|path| path.distance_to(point).map(|d| (d, path)))
            .filter(|(d, _)| *d <= tolerance)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, path)| path)
    }
}

/// Bounds over every non-sentinel point of every primitive.
pub fn geometry_bounds(nets: &[Net]) -> Option<Rect> {
    let mut points = nets
        .iter()
        .flat_map(|net| net.primitives.iter())
        .flat_map(|primitive| primitive.drawable_points())
        .map(design_point);
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |bounds, point| {
        bounds.union_pt(point)
    }))
}

pub fn view_window(nets: &[Net]) -> ViewWindow {
    ViewWindow::from_bounds(geometry_bounds(nets).unwrap_or(DEFAULT_BOUNDS))
}

/// Outline of one primitive; each sentinel ends the current run.
pub fn build_path(primitive: &Primitive) -> BezPath {
    let mut path = BezPath::new();
    for run in primitive.polylines() {
        let mut points = run.iter().copied().map(design_point);
        if let Some(first) = points.next() {
            path.move_to(first);
            for point in points {
                path.line_to(point);
            }
        }
    }
    path
}

pub fn project(nets: &[Net], selected: Option<&PrimitiveId>) -> Scene {
    let bounds = geometry_bounds(nets);
    let window = ViewWindow::from_bounds(bounds.unwrap_or(DEFAULT_BOUNDS));
    let paths = nets
        .iter()
        .flat_map(|net| {
            net.primitives.iter().map(move |primitive| ScenePath {
                net: net.name.clone(),
                primitive_id: primitive.id.clone(),
                layer: primitive.layer.clone(),
                width: primitive.width,
                path: build_path(primitive),
                selected: selected == Some(&primitive.id),
            })
        })
        .collect();
    Scene {
        bounds,
        window,
        paths,
    }
}

#[cfg(test)]
#[path = "tests/projector_tests.rs"]
mod tests;
