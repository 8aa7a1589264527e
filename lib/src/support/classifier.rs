//! Support and interface classification of grid cells.
//!
//! Given a query height, decides whether a column needs bulk support or
//! interface material at that height. In surface-only mode only the lowest
//! crossing of a column matters; in internal mode crossings alternate
//! underside/top as the column passes through solid material, and every
//! qualifying underside gets its own support span.

use super::field::{Crossing, GridCell, SupportField, VisitedMask};
use crate::config::SupportConfig;
use crate::{Coord, CoordF};

/// Extra clearance kept below every supported surface (µm).
pub const EXTRA_ERROR_GAP: Coord = 20;

/// Support/interface predicates over a built field.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    field: &'a SupportField,
    support_z_distance: Coord,
    interface_z_distance: Coord,
    cos_threshold: CoordF,
    internal: bool,
}

impl<'a> Classifier<'a> {
    pub fn new(field: &'a SupportField, config: &SupportConfig) -> Self {
        Self {
            field,
            support_z_distance: config.support_z_distance(),
            interface_z_distance: config.interface_z_distance(),
            cos_threshold: config.cos_threshold(),
            internal: config.generate_internal_support,
        }
    }

    /// The field being classified.
    #[inline]
    pub fn field(&self) -> &'a SupportField {
        self.field
    }

    #[inline]
    fn claimable(&self, cell: GridCell, visited: &VisitedMask) -> bool {
        self.field.is_generated() && !self.field.is_border(cell) && !visited.is_visited(cell)
    }

    #[inline]
    fn needs_angle(&self, crossing: &Crossing) -> bool {
        crossing.cos_angle() >= self.cos_threshold
    }

    /// Lowest height of the interface band below `surface`.
    #[inline]
    fn band_bottom(&self, surface: Coord) -> Coord {
        surface - self.interface_z_distance - self.support_z_distance - EXTRA_ERROR_GAP
    }

    /// Highest height of the interface band below `surface`.
    #[inline]
    fn band_top(&self, surface: Coord) -> Coord {
        surface - self.support_z_distance - EXTRA_ERROR_GAP
    }

    /// Whether `z` clears the top face below the underside at `index`.
    #[inline]
    fn above_previous_top(&self, column: &[Crossing], index: usize, z: Coord) -> bool {
        index == 0 || z > column[index - 1].height + self.support_z_distance
    }

    /// Undersides (even indices) that pass the angle test, with their index.
    fn undersides<'c>(
        &self,
        column: &'c [Crossing],
    ) -> impl Iterator<Item = (usize, &'c Crossing)> + 'c {
        let threshold = self.cos_threshold;
        column
            .iter()
            .enumerate()
            .step_by(2)
            .filter(move |(_, crossing)| crossing.cos_angle() >= threshold)
    }

    /// Whether bulk support is needed in `cell` at height `z`.
    ///
    /// Always false on the grid border, for claimed cells and on a disabled
    /// field.
    pub fn need_support(&self, cell: GridCell, z: Coord, visited: &VisitedMask) -> bool {
        if !self.claimable(cell, visited) {
            return false;
        }
        let column = self.field.column(cell);

        if self.internal {
            return self.undersides(column).any(|(i, bottom)| {
                z <= self.band_bottom(bottom.height) && self.above_previous_top(column, i, z)
            });
        }

        match column.first() {
            Some(first) => self.needs_angle(first) && z < self.band_bottom(first.height),
            None => false,
        }
    }

    /// Whether interface material is needed in `cell` at height `z`.
    pub fn need_interface(&self, cell: GridCell, z: Coord, visited: &VisitedMask) -> bool {
        if !self.claimable(cell, visited) {
            return false;
        }
        let column = self.field.column(cell);

        if self.internal {
            return self.undersides(column).any(|(i, bottom)| {
                z >= self.band_bottom(bottom.height)
                    && z <= self.band_top(bottom.height)
                    && self.above_previous_top(column, i, z)
            });
        }

        match column.first() {
            Some(first) => {
                self.needs_angle(first)
                    && z >= self.band_bottom(first.height)
                    && z < self.band_top(first.height)
            }
            None => false,
        }
    }
}
