//! Validated nets, primitives and points, and the sentinel convention.

use std::collections::HashSet;

use crate::{
    domain::PrimitiveId,
    error::DecodeError,
    protocol::{WireNet, WirePrimitive},
};

/// y-coordinate the engine writes into a point to mark a path break.
pub const SENTINEL_Y: f64 = f64::MAX;
/// Any y within this distance of [`SENTINEL_Y`] is a sentinel.
pub const SENTINEL_TOLERANCE: f64 = 1e20;

/// A coordinate pair in design units, y-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn sentinel() -> Self {
        Self::new(0.0, SENTINEL_Y)
    }

    pub fn is_sentinel(self) -> bool {
        is_sentinel(self)
    }

    /// Signed arc height the engine stores in a sentinel's x-coordinate.
    pub fn arc_height(self) -> Option<f64> {
        is_sentinel(self).then_some(self.x)
    }
}

/// True when `point` is a path break rather than a location.
pub fn is_sentinel(point: Point) -> bool {
    (point.y - SENTINEL_Y).abs() < SENTINEL_TOLERANCE
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub id: PrimitiveId,
    pub kind: String,
    pub layer: String,
    pub width: f64,
    pub points: Vec<Point>,
}

impl Primitive {
    /// Runs of consecutive non-sentinel points, in order. Empty runs (leading,
    /// trailing or doubled sentinels) are skipped.
    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> + '_ {
        self.points
            .split(|point| is_sentinel(*point))
            .filter(|run| !run.is_empty())
    }

    pub fn drawable_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied().filter(|point| !is_sentinel(*point))
    }

    pub fn has_geometry(&self) -> bool {
        self.drawable_points().next().is_some()
    }

    pub fn break_count(&self) -> usize {
        self.points.iter().filter(|point| is_sentinel(**point)).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Net {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

impl Net {
    pub fn primitive(&self, id: &PrimitiveId) -> Option<&Primitive> {
        self.primitives.iter().find(|primitive| &primitive.id == id)
    }
}

/// Finds a primitive and its owning net anywhere in a loaded collection.
pub fn find_primitive<'a>(nets: &'a [Net], id: &PrimitiveId) -> Option<(&'a Net, &'a Primitive)> {
    nets.iter()
        .find_map(|net| net.primitive(id).map(|primitive| (net, primitive)))
}

pub fn primitive_count(nets: &[Net]) -> usize {
    nets.iter().map(|net| net.primitives.len()).sum()
}

pub fn decode_nets(wire: Vec<WireNet>) -> Result<Vec<Net>, DecodeError> {
    wire.into_iter().map(decode_net).collect()
}

fn decode_net(wire: WireNet) -> Result<Net, DecodeError> {
    let mut seen = HashSet::with_capacity(wire.primitives.len());
    let mut primitives = Vec::with_capacity(wire.primitives.len());
    for primitive in wire.primitives {
        if !seen.insert(primitive.id.clone()) {
            return Err(DecodeError::DuplicatePrimitiveId {
                net: wire.name,
                primitive: primitive.id,
            });
        }
        primitives.push(decode_primitive(&wire.name, primitive)?);
    }
    Ok(Net {
        name: wire.name,
        primitives,
    })
}

fn decode_primitive(net: &str, wire: WirePrimitive) -> Result<Primitive, DecodeError> {
    let mut points = Vec::with_capacity(wire.points.len());
    for (index, coords) in wire.points.iter().enumerate() {
        let [x, y] = coords.as_slice() else {
            return Err(DecodeError::MalformedPoint {
                net: net.to_string(),
                primitive: wire.id,
                index,
                arity: coords.len(),
            });
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(DecodeError::NonFiniteCoordinate {
                net: net.to_string(),
                primitive: wire.id,
                index,
            });
        }
        points.push(Point::new(*x, *y));
    }
    Ok(Primitive {
        id: wire.id,
        kind: wire.kind,
        layer: wire.layer,
        width: wire.width,
        points,
    })
}

#[cfg(test)]
#[path = "tests/geometry_tests.rs"]
mod tests;
