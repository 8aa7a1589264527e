//! Post-processing of traced support regions into printable islands.
//!
//! Raw traced outlines are grown by the XY clearance, the layer's model
//! outline (grown by the same clearance) is cut away, thin slivers are removed
//! by an inset/outset pass of one extrusion width, and what remains is split
//! into disjoint islands ready for infill.

use super::SupportRegions;
use crate::clipper::{self, OffsetJoinType};
use crate::config::SupportConfig;
use crate::geometry::{ExPolygon, ExPolygons, Polygon};
use crate::Coord;

/// Printable support and interface islands for one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportIslands {
    pub support: ExPolygons,
    pub interface: ExPolygons,
}

impl SupportIslands {
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.interface.is_empty()
    }

    /// Combined island area (mm²).
    pub fn total_area(&self) -> f64 {
        let scaled = clipper::total_area(&self.support) + clipper::total_area(&self.interface);
        scaled / (crate::SCALING_FACTOR * crate::SCALING_FACTOR)
    }
}

/// Turns raw traced regions into printable islands.
#[derive(Debug, Clone)]
pub struct SupportPostProcessor {
    xy_distance: Coord,
    extrusion_width: Coord,
    join_type: OffsetJoinType,
}

impl SupportPostProcessor {
    pub fn new(config: &SupportConfig) -> Self {
        Self {
            xy_distance: config.xy_distance,
            extrusion_width: config.extrusion_width,
            join_type: OffsetJoinType::Round,
        }
    }

    /// Builder method to set the corner join used by all offsets
    pub fn with_join_type(mut self, join_type: OffsetJoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Grow raw traced outlines by the XY clearance.
    ///
    /// Single-row outlines become strips twice the clearance wide; without a
    /// clearance they have no area and are dropped.
    pub fn expand(&self, raw: &[Polygon]) -> ExPolygons {
        if self.xy_distance == 0 {
            return clipper::union_ex(raw);
        }
        clipper::offset_polygons(raw, self.xy_distance, self.join_type)
    }

    /// Remove the model outline, grown by the XY clearance, from `support`.
    pub fn subtract_model(&self, support: &[ExPolygon], outlines: &[ExPolygon]) -> ExPolygons {
        if support.is_empty() || outlines.is_empty() {
            return support.to_vec();
        }
        let keep_out = clipper::grow(outlines, self.xy_distance, self.join_type);
        clipper::difference(support, &keep_out)
    }

    /// Inset then outset by one extrusion width, dropping parts too thin to
    /// print and smoothing the rest.
    pub fn open_close(&self, areas: &[ExPolygon]) -> ExPolygons {
        if self.extrusion_width == 0 {
            return areas.to_vec();
        }
        let opened = clipper::shrink(areas, self.extrusion_width, self.join_type);
        clipper::grow(&opened, self.extrusion_width, self.join_type)
    }

    /// Merge overlapping areas into disjoint islands.
    pub fn split_islands(&self, areas: &[ExPolygon]) -> ExPolygons {
        clipper::union_all(areas)
    }

    /// Run the whole chain on one set of raw outlines.
    pub fn process_layer(&self, raw: &[Polygon], outlines: &[ExPolygon]) -> ExPolygons {
        let expanded = self.expand(raw);
        let trimmed = self.subtract_model(&expanded, outlines);
        let smoothed = self.open_close(&trimmed);
        self.split_islands(&smoothed)
    }

    /// Process both the support and the interface outlines of a layer.
    pub fn process_regions(&self, regions: &SupportRegions, outlines: &[ExPolygon]) -> SupportIslands {
        SupportIslands {
            support: self.process_layer(&regions.support, outlines),
            interface: self.process_layer(&regions.interface, outlines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn square(x: Coord, y: Coord, size: Coord) -> Polygon {
        Polygon::rectangle(Point::new(x, y), Point::new(x + size, y + size))
    }

    fn any_contains(areas: &[ExPolygon], p: Point) -> bool {
        areas.iter().any(|a| a.contains_point(&p))
    }

    #[test]
    fn test_expand_grows_by_clearance() {
        let processor = SupportPostProcessor::new(&SupportConfig::default())
            .with_join_type(OffsetJoinType::Miter);
        let expanded = processor.expand(&[square(0, 0, 2_000)]);

        assert_eq!(expanded.len(), 1);
        let bb = expanded[0].bounding_box();
        assert!((bb.min.x + 700).abs() <= 2);
        assert!((bb.max.y - 2_700).abs() <= 2);
    }

    #[test]
    fn test_expand_without_clearance_unions() {
        let config = SupportConfig::default().with_xy_distance(0);
        let processor = SupportPostProcessor::new(&config);
        let expanded = processor.expand(&[square(0, 0, 2_000), square(1_000, 0, 2_000)]);
        assert_eq!(expanded.len(), 1);
    }

    #[test]
    fn test_subtract_model() {
        let processor = SupportPostProcessor::new(&SupportConfig::default());
        let support: ExPolygons = vec![square(0, 0, 10_000).into()];
        let outline: ExPolygons = vec![square(4_000, 4_000, 2_000).into()];

        let trimmed = processor.subtract_model(&support, &outline);
        assert!(!any_contains(&trimmed, Point::new(5_000, 5_000)));
        // Inside the clearance ring around the outline
        assert!(!any_contains(&trimmed, Point::new(3_500, 5_000)));
        assert!(any_contains(&trimmed, Point::new(1_000, 1_000)));

        assert_eq!(processor.subtract_model(&support, &[]), support);
    }

    #[test]
    fn test_open_close_removes_slivers() {
        let processor = SupportPostProcessor::new(&SupportConfig::default());
        let sliver: ExPolygon =
            Polygon::rectangle(Point::new(0, 0), Point::new(10_000, 500)).into();
        let block: ExPolygon = square(20_000, 0, 5_000).into();

        let result = processor.open_close(&[sliver, block.clone()]);
        assert_eq!(result.len(), 1);
        assert!(any_contains(&result, Point::new(22_500, 2_500)));
        let area = clipper::total_area(&result);
        assert!((area - block.area()).abs() / block.area() < 0.05);
    }

    #[test]
    fn test_split_islands() {
        let processor = SupportPostProcessor::new(&SupportConfig::default());
        let areas: ExPolygons = vec![
            square(0, 0, 2_000).into(),
            square(1_500, 0, 2_000).into(),
            square(10_000, 10_000, 1_000).into(),
        ];
        assert_eq!(processor.split_islands(&areas).len(), 2);
    }

    #[test]
    fn test_process_layer_chain() {
        let processor = SupportPostProcessor::new(&SupportConfig::default());
        let raw = vec![square(0, 0, 10_000), square(20_000, 0, 300)];
        let outline: ExPolygons = vec![square(4_000, 4_000, 2_000).into()];

        let islands = processor.process_layer(&raw, &outline);
        assert!(!islands.is_empty());
        assert!(!any_contains(&islands, Point::new(5_000, 5_000)));
        assert!(any_contains(&islands, Point::new(1_000, 1_000)));
        // The small square grows to 1.7mm and survives the open/close pass
        assert!(any_contains(&islands, Point::new(20_150, 150)));
    }

    #[test]
    fn test_single_row_region_survives() {
        let processor = SupportPostProcessor::new(&SupportConfig::default());
        // Outline traced from one row of cells: left edge to last cell center
        let row = Polygon::from_points(vec![Point::new(4_000, 1_000), Point::new(900, 1_000)]);

        let islands = processor.process_layer(&[row], &[]);
        assert_eq!(islands.len(), 1);
        assert!(any_contains(&islands, Point::new(2_000, 1_000)));
        assert!(any_contains(&islands, Point::new(2_000, 1_500)));
        assert!(!any_contains(&islands, Point::new(2_000, 1_800)));
    }

    #[test]
    fn test_process_regions() {
        let processor = SupportPostProcessor::new(&SupportConfig::default());
        let regions = SupportRegions {
            support: vec![square(0, 0, 5_000)],
            interface: Vec::new(),
        };
        let islands = processor.process_regions(&regions, &[]);
        assert_eq!(islands.support.len(), 1);
        assert!(islands.interface.is_empty());
        assert!(!islands.is_empty());
        // 5mm square grown by 0.7mm with round corners
        assert!(islands.total_area() > 25.0 && islands.total_area() < 6.4 * 6.4);
    }
}
