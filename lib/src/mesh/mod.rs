//! Mesh input for support generation.
//!
//! This module provides the indexed triangle mesh the field builder consumes:
//! - [`TriangleMesh`] - The main triangle mesh data structure
//! - [`Triangle`] - A single triangle
//!
//! Loading and repairing meshes happens upstream; this type only carries
//! vertex positions (mm) and triangle indices.

mod triangle_mesh;

pub use triangle_mesh::{Triangle, TriangleMesh};
