//! Region boundary tracing over the support field.
//!
//! The tracer scans the grid once and, for every unclaimed cell where a
//! predicate holds, walks the region row by row: each row is extended to the
//! right, then the next row's start is searched inside the previous row's
//! span and extended back to the left. The right ends form the leading side
//! of the outline and the left starts, reversed, close it. Cells are claimed
//! as they are walked so no cell is evaluated into two regions.

use super::field::{GridCell, SupportField, VisitedMask};
use crate::geometry::{Point, Polygon, Polygons};
use crate::Coord;

/// A cell predicate evaluated during tracing.
///
/// Implemented for any `Fn(GridCell, Coord, &VisitedMask) -> bool`, so the
/// classifier rules can be passed as closures.
pub trait RegionPredicate {
    fn holds(&self, cell: GridCell, z: Coord, visited: &VisitedMask) -> bool;
}

impl<F> RegionPredicate for F
where
    F: Fn(GridCell, Coord, &VisitedMask) -> bool,
{
    #[inline]
    fn holds(&self, cell: GridCell, z: Coord, visited: &VisitedMask) -> bool {
        self(cell, z, visited)
    }
}

/// Extracts region outlines from a field at one height.
///
/// Each tracer owns its own visited mask; create one per traced height.
#[derive(Debug)]
pub struct RegionTracer<'a> {
    field: &'a SupportField,
    visited: VisitedMask,
}

impl<'a> RegionTracer<'a> {
    /// Create a tracer with a cleared visited mask sized to `field`.
    pub fn new(field: &'a SupportField) -> Self {
        Self {
            field,
            visited: VisitedMask::for_field(field),
        }
    }

    pub fn field(&self) -> &'a SupportField {
        self.field
    }

    /// Cells claimed so far.
    pub fn visited(&self) -> &VisitedMask {
        &self.visited
    }

    pub fn visited_mut(&mut self) -> &mut VisitedMask {
        &mut self.visited
    }

    /// Trace all regions where `predicate` holds at height `z`.
    ///
    /// Outlines are in world coordinates (µm).
    pub fn trace<P: RegionPredicate>(&mut self, predicate: &P, z: Coord) -> Polygons {
        let predicates: [&dyn RegionPredicate; 1] = [predicate];
        self.trace_many(&predicates, z).pop().unwrap_or_default()
    }

    /// Trace several predicates in one scan over a shared visited mask.
    ///
    /// An unclaimed cell starts a region for the first predicate that holds
    /// there. Returns one polygon set per predicate, in order.
    pub fn trace_many(&mut self, predicates: &[&dyn RegionPredicate], z: Coord) -> Vec<Polygons> {
        let mut regions: Vec<Polygons> = vec![Vec::new(); predicates.len()];
        if !self.field.is_generated() {
            return regions;
        }

        let width = self.field.width() as i64;
        let height = self.field.height() as i64;

        for y in 1..height {
            for x in 1..width {
                let cell = GridCell::new(x, y);
                if self.visited.is_visited(cell) {
                    continue;
                }

                let claimed = predicates
                    .iter()
                    .position(|predicate| predicate.holds(cell, z, &self.visited));
                if let Some(idx) = claimed {
                    let outline = self.lazy_fill(predicates[idx], cell, z);
                    regions[idx].push(outline);
                }
            }
        }

        log::trace!(
            "Traced z={}: {} regions, {} cells claimed",
            z,
            regions.iter().map(Vec::len).sum::<usize>(),
            self.visited.visited_count()
        );

        regions
    }

    /// Walk one region starting at `start`, claiming its cells.
    fn lazy_fill(&mut self, predicate: &dyn RegionPredicate, mut start: GridCell, z: Coord) -> Polygon {
        let half_cell = Point::new(self.field.cell_size() / 2, 0);
        let mut outline = Polygon::new();
        let mut trailing: Vec<Point> = Vec::new();

        loop {
            let mut end = start;
            self.visited.mark(end);
            while predicate.holds(end.offset_x(1), z, &self.visited) {
                end = end.offset_x(1);
                self.visited.mark(end);
            }

            trailing.push(self.field.cell_to_world(start) - half_cell);
            outline.push(self.field.cell_to_world(end));

            start.y += 1;
            while start.x <= end.x && !predicate.holds(start, z, &self.visited) {
                start.x += 1;
            }

            if start.x > end.x {
                for p in trailing.into_iter().rev() {
                    outline.push(p);
                }
                return outline;
            }

            while start.x > 1 && predicate.holds(start.offset_x(-1), z, &self.visited) {
                start.x -= 1;
            }
        }
    }
}
