//! The support field: a 2D grid of per-column surface crossings.
//!
//! Each grid cell holds the heights at which a vertical ray through the cell
//! center passes through the model surface, together with the tilt of the
//! surface at that point. Columns are sorted ascending by height and never
//! contain two crossings at the same height.

use crate::geometry::Point;
use crate::{Coord, CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A point where the model surface crosses a grid column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    /// Height of the crossing (µm).
    pub height: Coord,
    /// Angle of the surface normal from vertical (radians). Zero for a flat
    /// horizontal face, `π/2` for a vertical wall.
    pub surface_angle: CoordF,
}

impl Crossing {
    /// Create a new crossing record.
    #[inline]
    pub fn new(height: Coord, surface_angle: CoordF) -> Self {
        Self {
            height,
            surface_angle,
        }
    }

    /// Build a crossing from the cosine of the surface angle.
    #[inline]
    pub fn from_cos(height: Coord, cos_angle: CoordF) -> Self {
        Self::new(height, cos_angle.clamp(-1.0, 1.0).acos())
    }

    /// Cosine of the surface angle (`|n.z| / |n|` for the face normal).
    #[inline]
    pub fn cos_angle(&self) -> CoordF {
        self.surface_angle.cos()
    }

    fn column_order(&self, other: &Self) -> Ordering {
        self.height
            .cmp(&other.height)
            .then_with(|| self.surface_angle.total_cmp(&other.surface_angle))
    }
}

/// Integer coordinate of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The cell `dx` columns to the right (negative for left).
    #[inline]
    pub const fn offset_x(self, dx: i64) -> Self {
        Self::new(self.x + dx, self.y)
    }
}

impl From<(i64, i64)> for GridCell {
    #[inline]
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

/// Grid of surface crossings covering the model footprint.
///
/// Built once per model by [`FieldBuilder`](super::FieldBuilder) and
/// read-only afterwards.
#[derive(Clone)]
pub struct SupportField {
    origin: Point,
    cell_size: Coord,
    width: usize,
    height: usize,
    columns: Vec<Vec<Crossing>>,
    generated: bool,
}

impl SupportField {
    /// A field for which support generation is turned off. Every query on
    /// it comes back empty.
    pub fn disabled() -> Self {
        Self {
            origin: Point::zero(),
            cell_size: 1,
            width: 0,
            height: 0,
            columns: Vec::new(),
            generated: false,
        }
    }

    /// Assemble a field from raw columns indexed `x + y * width`.
    ///
    /// Each column is sorted by height and exact height duplicates are
    /// removed. Ties keep the record with the smallest surface angle rather
    /// than the first one pushed, so the field does not depend on triangle
    /// order.
    pub fn with_columns(
        origin: Point,
        cell_size: Coord,
        width: usize,
        height: usize,
        mut columns: Vec<Vec<Crossing>>,
    ) -> Result<Self> {
        if cell_size <= 0 {
            return Err(Error::Geometry(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        if columns.len() != width * height {
            return Err(Error::Geometry(format!(
                "expected {} columns for a {}x{} grid, got {}",
                width * height,
                width,
                height,
                columns.len()
            )));
        }

        for column in &mut columns {
            column.sort_by(Crossing::column_order);
            column.dedup_by_key(|c| c.height);
        }

        Ok(Self {
            origin,
            cell_size,
            width,
            height,
            columns,
            generated: true,
        })
    }

    /// Whether the field was built (support enabled).
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// World position of cell (0, 0) (µm).
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Grid resolution (µm).
    #[inline]
    pub fn cell_size(&self) -> Coord {
        self.cell_size
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of crossings across all columns.
    pub fn crossing_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Whether the cell lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    /// Whether the cell is outside the grid or on its one-cell outer ring.
    #[inline]
    pub fn is_border(&self, cell: GridCell) -> bool {
        cell.x < 1
            || cell.y < 1
            || cell.x >= self.width as i64 - 1
            || cell.y >= self.height as i64 - 1
    }

    /// Linear index of the cell, if it lies inside the grid.
    #[inline]
    pub fn cell_index(&self, cell: GridCell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.x as usize + cell.y as usize * self.width)
    }

    /// Crossings of a column, ascending by height. Empty outside the grid.
    #[inline]
    pub fn column(&self, cell: GridCell) -> &[Crossing] {
        match self.cell_index(cell) {
            Some(idx) => &self.columns[idx],
            None => &[],
        }
    }

    /// World position of a cell (µm).
    #[inline]
    pub fn cell_to_world(&self, cell: GridCell) -> Point {
        Point::new(
            cell.x * self.cell_size + self.origin.x,
            cell.y * self.cell_size + self.origin.y,
        )
    }

    /// Nearest cell to a world position. May lie outside the grid.
    pub fn world_to_cell(&self, p: Point) -> GridCell {
        let fx = (p.x - self.origin.x) as CoordF / self.cell_size as CoordF;
        let fy = (p.y - self.origin.y) as CoordF / self.cell_size as CoordF;
        GridCell::new(fx.round() as i64, fy.round() as i64)
    }
}

impl fmt::Debug for SupportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.generated {
            return write!(f, "SupportField(disabled)");
        }
        write!(
            f,
            "SupportField({}x{} cells of {}µm at {:?}, {} crossings)",
            self.width,
            self.height,
            self.cell_size,
            self.origin,
            self.crossing_count()
        )
    }
}

/// Cells already claimed by a region during one trace.
///
/// Owned by a single [`RegionTracer`](super::RegionTracer) and sized to its
/// field; never shared between traces.
#[derive(Clone, Debug)]
pub struct VisitedMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl VisitedMask {
    /// A cleared mask for a `width` x `height` grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// A cleared mask sized to a field.
    pub fn for_field(field: &SupportField) -> Self {
        Self::new(field.width(), field.height())
    }

    #[inline]
    fn index(&self, cell: GridCell) -> Option<usize> {
        (cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height)
            .then(|| cell.x as usize + cell.y as usize * self.width)
    }

    /// Whether the cell has been claimed. Cells outside the grid never are.
    #[inline]
    pub fn is_visited(&self, cell: GridCell) -> bool {
        self.index(cell).map_or(false, |idx| self.cells[idx])
    }

    /// Claim a cell. Out-of-range cells are ignored.
    #[inline]
    pub fn mark(&mut self, cell: GridCell) {
        if let Some(idx) = self.index(cell) {
            self.cells[idx] = true;
        }
    }

    /// Claim every cell.
    pub fn mark_all(&mut self) {
        self.cells.fill(true);
    }

    /// Release every cell.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Number of claimed cells.
    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }
}
