//! # Slicer Support
//!
//! Grid-based support structure synthesis for a layer slicer.
//!
//! Given a triangle mesh, the engine builds a [`SupportField`] once: a 2D grid
//! over the model footprint where every column records the heights at which
//! the model surface crosses it. Each requested layer height is then
//! classified cell by cell and the qualifying cells are traced into support
//! and interface polygons:
//!
//! - [`FieldBuilder`] - rasterizes mesh triangles into crossing columns
//! - [`Classifier`] - "needs support" / "needs interface" predicates
//! - [`RegionTracer`] - lazy boundary walk turning cells into polygons
//! - [`SupportAreaGenerator`] - per-layer driver tying the above together
//! - [`SupportPostProcessor`] - clearance, smoothing and island split helpers
//!
//! ## Example
//!
//! ```rust,ignore
//! use slicer_support::{SupportAreaGenerator, SupportConfig, TriangleMesh};
//!
//! let mesh: TriangleMesh = load_somehow();
//! let mut generator = SupportAreaGenerator::new(SupportConfig::default())?;
//! generator.build_field(&mesh)?;
//! let layer = generator.generate_layer(10);
//! println!("{} support regions", layer.support.len());
//! ```

pub mod clipper;
pub mod config;
pub mod geometry;
pub mod mesh;
pub mod support;

pub use config::SupportConfig;
pub use geometry::{BoundingBox, BoundingBox3F, ExPolygon, ExPolygons, Point, Point3, Point3F};
pub use geometry::{Polygon, Polygons};
pub use mesh::{Triangle, TriangleMesh};
pub use support::{
    support_sample_z, Classifier, Crossing, FieldBuilder, GridCell, RegionPredicate,
    RegionTracer, SupportAreaGenerator, SupportField, SupportIslands, SupportLayer,
    SupportPostProcessor, SupportRegions, VisitedMask,
};

/// Coordinate type used throughout the engine.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 micrometer, so 1mm = 1_000 units.
pub const SCALING_FACTOR: f64 = 1_000.0;

/// Scale a floating-point coordinate (mm) to integer micrometers.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate (micrometers) to floating-point mm.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for support generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid geometry: {0}")]
    Geometry(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
