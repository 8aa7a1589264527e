//! Point types for 2D and 3D geometry.
//!
//! Integer points carry micrometer coordinates; the floating-point 3D point
//! carries millimetres as read from a mesh.

use crate::{scale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// A 2D point with scaled integer coordinates.
///
/// Points use integer coordinates scaled by `SCALING_FACTOR` to avoid
/// floating-point precision issues. 1 unit = 1 micrometer.
///
/// # Example
/// ```
/// use slicer_support::geometry::Point;
/// use slicer_support::scale;
///
/// // A point at (1mm, 2mm)
/// let p = Point::new(scale(1.0), scale(2.0));
/// assert_eq!(p, Point::new(1_000, 2_000));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Create a new point with the given coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a point at the origin (0, 0).
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// A 3D point with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point3 {
    pub x: Coord,
    pub y: Coord,
    pub z: Coord,
}

impl Point3 {
    /// Create a new 3D point.
    #[inline]
    pub const fn new(x: Coord, y: Coord, z: Coord) -> Self {
        Self { x, y, z }
    }

    /// Vector length.
    #[inline]
    pub fn length(&self) -> CoordF {
        let (x, y, z) = (self.x as i128, self.y as i128, self.z as i128);
        ((x * x + y * y + z * z) as CoordF).sqrt()
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Point3) -> i128 {
        (self.x as i128) * (other.x as i128)
            + (self.y as i128) * (other.y as i128)
            + (self.z as i128) * (other.z as i128)
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: &Point3) -> Point3 {
        Point3 {
            x: ((self.y as i128 * other.z as i128 - self.z as i128 * other.y as i128)
                .clamp(Coord::MIN as i128, Coord::MAX as i128)) as Coord,
            y: ((self.z as i128 * other.x as i128 - self.x as i128 * other.z as i128)
                .clamp(Coord::MIN as i128, Coord::MAX as i128)) as Coord,
            z: ((self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128)
                .clamp(Coord::MIN as i128, Coord::MAX as i128)) as Coord,
        }
    }
}

impl fmt::Debug for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point3({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

/// A 3D point with floating-point coordinates (in mm).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3F {
    pub x: CoordF,
    pub y: CoordF,
    pub z: CoordF,
}

impl Point3F {
    /// Create a new 3D floating-point point.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self { x, y, z }
    }

    /// Convert to scaled integer coordinates (micrometers).
    #[inline]
    pub fn to_scaled(&self) -> Point3 {
        Point3::new(scale(self.x), scale(self.y), scale(self.z))
    }
}

impl fmt::Debug for Point3F {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point3F({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}
