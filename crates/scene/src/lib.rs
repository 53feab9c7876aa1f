//! Scene projection for trace geometry: bounding window, sentinel-aware path
//! construction, hit testing, pan/zoom transport and SVG export.

pub mod projector;
pub mod svg;
pub mod view;

pub use kurbo;
pub use projector::{project, Scene, ScenePath, ViewWindow};
pub use view::{ViewInput, ViewTransport};
