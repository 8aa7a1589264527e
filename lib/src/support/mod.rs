//! Support structure generation.
//!
//! This module decides, for any horizontal plane through the model, which
//! locations are unsupported overhangs and turns that decision into
//! printable polygons:
//! - Field construction (per-column surface crossings from the mesh)
//! - Support/interface classification at a query height
//! - Region tracing (boundary walk over qualifying grid cells)
//! - Post-processing into printable islands
//!
//! # Algorithm Overview
//!
//! 1. **Field Construction**: Every triangle is projected onto a 2D grid over
//!    the model footprint. Each grid column records the heights where a
//!    vertical ray crosses the model surface, and the tilt of the surface
//!    there.
//!
//! 2. **Classification**: At a given height a column needs support when it is
//!    below an overhanging surface by at least the Z gap (plus the interface
//!    band), and interface material when it is inside that band.
//!
//! 3. **Tracing**: Qualifying cells are grouped into regions with a single
//!    row-by-row boundary walk, giving one outline per region.
//!
//! 4. **Post-processing**: Outlines are grown by the XY clearance, the model
//!    outline is cut away, slivers are removed and the result is split into
//!    islands.

mod builder;
mod classifier;
mod field;
pub mod post_process;
mod tracer;

pub use builder::FieldBuilder;
pub use classifier::{Classifier, EXTRA_ERROR_GAP};
pub use field::{Crossing, GridCell, SupportField, VisitedMask};
pub use post_process::{SupportIslands, SupportPostProcessor};
pub use tracer::{RegionPredicate, RegionTracer};

use crate::config::SupportConfig;
use crate::geometry::Polygons;
use crate::mesh::TriangleMesh;
use crate::{Coord, Result};

/// Height at which support for a layer is evaluated (µm): the middle of
/// the layer.
pub fn support_sample_z(layer_index: usize, config: &SupportConfig) -> Coord {
    let first = config.first_layer_thickness;
    if layer_index == 0 {
        return first / 2;
    }
    first + (layer_index as Coord - 1) * config.layer_thickness + config.layer_thickness / 2
}

/// Raw traced outlines at one height (world µm).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportRegions {
    /// Bulk support outlines
    pub support: Polygons,
    /// Interface outlines, directly below supported surfaces
    pub interface: Polygons,
}

impl SupportRegions {
    /// Check if no region was traced
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.interface.is_empty()
    }

    /// Total number of traced outlines
    pub fn region_count(&self) -> usize {
        self.support.len() + self.interface.len()
    }
}

/// Represents a single layer of support structure
#[derive(Debug, Clone)]
pub struct SupportLayer {
    /// Layer index
    pub layer_id: usize,
    /// Sample height of this layer (µm)
    pub z: Coord,
    /// Bulk support outlines
    pub support: Polygons,
    /// Interface outlines
    pub interface: Polygons,
}

impl SupportLayer {
    /// Create a new empty support layer
    pub fn new(layer_id: usize, z: Coord) -> Self {
        Self {
            layer_id,
            z,
            support: Vec::new(),
            interface: Vec::new(),
        }
    }

    /// Check if this layer has any support
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.interface.is_empty()
    }

    /// Traced outlines of this layer.
    pub fn regions(&self) -> SupportRegions {
        SupportRegions {
            support: self.support.clone(),
            interface: self.interface.clone(),
        }
    }
}

/// Support generator - main entry point for support generation
///
/// Owns the configuration and, once built, the support field of one model.
#[derive(Debug)]
pub struct SupportAreaGenerator {
    config: SupportConfig,
    field: Option<SupportField>,
}

impl SupportAreaGenerator {
    /// Create a generator; fails if the configuration is invalid.
    pub fn new(config: SupportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            field: None,
        })
    }

    /// Use an already built field.
    pub fn with_field(mut self, field: SupportField) -> Self {
        self.field = Some(field);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &SupportConfig {
        &self.config
    }

    /// The support field, if built.
    pub fn field(&self) -> Option<&SupportField> {
        self.field.as_ref()
    }

    /// Build the support field for `mesh`, replacing any previous one.
    pub fn build_field(&mut self, mesh: &TriangleMesh) -> Result<()> {
        let field = FieldBuilder::new(&self.config).build_for_mesh(mesh)?;
        self.field = Some(field);
        Ok(())
    }

    /// Trace support and interface outlines at height `z` (µm).
    ///
    /// Every cell is claimed by support first, then interface. Returns empty
    /// regions when no field is built or support is disabled.
    pub fn generate_at(&self, z: Coord) -> SupportRegions {
        let Some(field) = self.field.as_ref() else {
            return SupportRegions::default();
        };
        if !field.is_generated() {
            return SupportRegions::default();
        }

        let classifier = Classifier::new(field, &self.config);
        let need_support = |cell: GridCell, z: Coord, visited: &VisitedMask| {
            classifier.need_support(cell, z, visited)
        };
        let need_interface = |cell: GridCell, z: Coord, visited: &VisitedMask| {
            classifier.need_interface(cell, z, visited)
        };

        let mut tracer = RegionTracer::new(field);
        let mut traced = tracer.trace_many(&[&need_support, &need_interface], z);
        let interface = traced.pop().unwrap_or_default();
        let support = traced.pop().unwrap_or_default();

        log::debug!(
            "Support at z={}: {} support, {} interface regions",
            z,
            support.len(),
            interface.len()
        );

        SupportRegions { support, interface }
    }

    /// Trace the support of one layer at its sample height.
    pub fn generate_layer(&self, layer_index: usize) -> SupportLayer {
        let z = support_sample_z(layer_index, &self.config);
        let regions = self.generate_at(z);
        SupportLayer {
            layer_id: layer_index,
            z,
            support: regions.support,
            interface: regions.interface,
        }
    }

    /// Trace the first `layer_count` layers.
    pub fn generate_layers(&self, layer_count: usize) -> Vec<SupportLayer> {
        let layers: Vec<SupportLayer> = (0..layer_count)
            .map(|idx| self.generate_layer(idx))
            .collect();

        log::info!(
            "Generated support for {} layers ({} with support)",
            layers.len(),
            layers.iter().filter(|l| !l.is_empty()).count()
        );
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Point3F};

    fn floating_slab() -> TriangleMesh {
        TriangleMesh::cuboid(Point3F::new(0.0, 0.0, 5.0), Point3F::new(10.0, 10.0, 8.0))
    }

    fn generator(config: SupportConfig) -> SupportAreaGenerator {
        let mut generator = SupportAreaGenerator::new(config).unwrap();
        generator.build_field(&floating_slab()).unwrap();
        generator
    }

    #[test]
    fn test_sample_z_schedule() {
        let config = SupportConfig::default();
        assert_eq!(support_sample_z(0, &config), 150);
        assert_eq!(support_sample_z(1, &config), 400);
        assert_eq!(support_sample_z(2, &config), 600);
        assert_eq!(support_sample_z(10, &config), 300 + 9 * 200 + 100);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SupportConfig {
            layer_thickness: 0,
            ..Default::default()
        };
        assert!(SupportAreaGenerator::new(config).is_err());
    }

    #[test]
    fn test_no_field_generates_nothing() {
        let generator = SupportAreaGenerator::new(SupportConfig::default()).unwrap();
        assert!(generator.field().is_none());
        assert!(generator.generate_at(1_000).is_empty());
    }

    #[test]
    fn test_disabled_generates_nothing() {
        let generator = generator(SupportConfig::disabled());
        assert!(!generator.field().unwrap().is_generated());
        assert!(generator.generate_layers(5).iter().all(SupportLayer::is_empty));
    }

    #[test]
    fn test_slab_support_below_surface() {
        let generator = generator(SupportConfig::default());

        let regions = generator.generate_at(1_000);
        assert_eq!(regions.support.len(), 1);
        assert!(regions.interface.is_empty());

        // Interior cells 1..=49 of a 51 cell grid, cell centers 100µm in
        let bb = regions.support[0].bounding_box();
        assert_eq!(bb.min, Point::new(200, 300));
        assert_eq!(bb.max, Point::new(9_900, 9_900));

        // Above the clearance below the slab and inside it
        assert!(generator.generate_at(4_900).is_empty());
        assert!(generator.generate_at(6_000).is_empty());
        assert!(generator.generate_at(9_000).is_empty());
    }

    #[test]
    fn test_slab_interface_band() {
        let config = SupportConfig::default().with_interface_layers(2);
        let generator = generator(config);

        // Band below the 5000µm surface is [4380, 4780]
        let support_only = generator.generate_at(4_000);
        assert_eq!(support_only.support.len(), 1);
        assert!(support_only.interface.is_empty());

        let interface_only = generator.generate_at(4_500);
        assert!(interface_only.support.is_empty());
        assert_eq!(interface_only.interface.len(), 1);
    }

    #[test]
    fn test_generate_layers() {
        let generator = generator(SupportConfig::default());
        let layers = generator.generate_layers(30);
        assert_eq!(layers.len(), 30);

        for layer in &layers {
            assert_eq!(layer.z, support_sample_z(layer.layer_id, generator.config()));
            let expect_support = layer.z < 5_000 - 200 - EXTRA_ERROR_GAP;
            assert_eq!(!layer.support.is_empty(), expect_support, "layer {}", layer.layer_id);
        }
        assert_eq!(layers[3].regions().region_count(), 1);
    }

    #[test]
    fn test_with_field() {
        let field = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&floating_slab())
            .unwrap();
        let generator = SupportAreaGenerator::new(SupportConfig::default())
            .unwrap()
            .with_field(field);
        assert_eq!(generator.generate_layer(0).support.len(), 1);
    }
}
