//! Geometry primitives for the support engine.
//!
//! This module provides the fundamental geometric types:
//! - [`Point`] and [`Point3`] - 2D and 3D points with integer coordinates (scaled)
//! - [`Point3F`] - 3D points with floating-point coordinates (mm, as stored in meshes)
//! - [`Polygon`] - Closed polygon (boundary)
//! - [`ExPolygon`] - Polygon with holes (exterior + interior contours)
//! - [`BoundingBox`] and [`BoundingBox3F`] - Axis-aligned bounding boxes
//!
//! ## Coordinate System
//!
//! Coordinates are scaled integers to avoid floating-point precision issues.
//! They are scaled by `SCALING_FACTOR` (1,000), so 1 unit = 1 micrometer.
//!
//! - Use `scale()` to convert from mm to internal units
//! - Use `unscale()` to convert from internal units to mm

mod bounding_box;
mod expolygon;
mod point;
mod polygon;

pub use bounding_box::{BoundingBox, BoundingBox3F};
pub use expolygon::{ExPolygon, ExPolygons};
pub use point::{Point, Point3, Point3F};
pub use polygon::{Polygon, Polygons};

/// Calculate the cross product of two 2D vectors (returns a scalar).
/// This is useful for determining the orientation of three points.
#[inline]
pub fn cross2(v1: Point, v2: Point) -> i128 {
    v1.x as i128 * v2.y as i128 - v1.y as i128 * v2.x as i128
}

/// Orientation of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise (left turn)
    CounterClockwise,
    /// Clockwise (right turn)
    Clockwise,
    /// Collinear (no turn)
    Collinear,
}

/// Determine the orientation of three points.
pub fn orientation(p1: Point, p2: Point, p3: Point) -> Orientation {
    let cross = cross2(p2 - p1, p3 - p2);
    if cross > 0 {
        Orientation::CounterClockwise
    } else if cross < 0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}
