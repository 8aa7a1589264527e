//! Bounding box types for 2D and 3D geometry.
//!
//! Axis-aligned boxes: integer micrometers in 2D (polygon extents, grid
//! footprints) and floating-point millimetres in 3D (mesh bounds).

use super::{Point, Point3F};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D axis-aligned bounding box with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl BoundingBox {
    /// Create a new empty (undefined) bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point::new(Coord::MAX, Coord::MAX),
            max: Point::new(Coord::MIN, Coord::MIN),
            defined: false,
        }
    }

    /// Create a bounding box from a slice of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Check if the bounding box is defined (has been merged with at least one point).
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Merge a point into the bounding box.
    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox(undefined)")
        }
    }
}

/// A 3D axis-aligned bounding box with floating-point coordinates (in mm).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3F {
    pub min: Point3F,
    pub max: Point3F,
    defined: bool,
}

impl BoundingBox3F {
    /// Create a new empty bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point3F::new(CoordF::MAX, CoordF::MAX, CoordF::MAX),
            max: Point3F::new(CoordF::MIN, CoordF::MIN, CoordF::MIN),
            defined: false,
        }
    }

    /// Check if the bounding box is defined.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Merge a point into the bounding box.
    pub fn merge_point(&mut self, p: Point3F) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.min.z = self.min.z.min(p.z);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
            self.max.z = self.max.z.max(p.z);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Get the size in x direction.
    #[inline]
    pub fn size_x(&self) -> CoordF {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0.0
        }
    }

    /// Get the size in y direction.
    #[inline]
    pub fn size_y(&self) -> CoordF {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0.0
        }
    }
}

impl fmt::Debug for BoundingBox3F {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox3F({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox3F(undefined)")
        }
    }
}
