//! Triangle mesh data structure.
//!
//! An indexed triangle set: a vertex array in millimetres plus index triples.

use crate::geometry::{BoundingBox3F, Point3F};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single triangle defined by three vertex indices.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    /// Indices into the vertex array for the three corners.
    pub indices: [u32; 3],
}

impl Triangle {
    /// Create a new triangle from vertex indices.
    #[inline]
    pub const fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self {
            indices: [v0, v1, v2],
        }
    }
}

impl fmt::Debug for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Triangle({}, {}, {})",
            self.indices[0], self.indices[1], self.indices[2]
        )
    }
}

/// A 3D triangle mesh represented as an indexed triangle set.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions (in mm, floating-point).
    vertices: Vec<Point3F>,
    /// Triangle indices into the vertex array.
    indices: Vec<Triangle>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    #[inline]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh from vertices and indices.
    pub fn from_parts(vertices: Vec<Point3F>, indices: Vec<Triangle>) -> Self {
        Self { vertices, indices }
    }

    /// Get the vertices of the mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point3F] {
        &self.vertices
    }

    /// Get the triangle indices.
    #[inline]
    pub fn indices(&self) -> &[Triangle] {
        &self.indices
    }

    /// Get the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, v: Point3F) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(v);
        idx
    }

    /// Add a triangle from vertex indices.
    pub fn add_triangle_indices(&mut self, v0: u32, v1: u32, v2: u32) {
        self.indices.push(Triangle::new(v0, v1, v2));
    }

    /// Get the three vertices of a triangle.
    ///
    /// Indices must be valid; call [`TriangleMesh::validate`] first for
    /// meshes from untrusted sources.
    #[inline]
    pub fn triangle_vertices(&self, tri_idx: usize) -> [Point3F; 3] {
        let tri = &self.indices[tri_idx];
        [
            self.vertices[tri.indices[0] as usize],
            self.vertices[tri.indices[1] as usize],
            self.vertices[tri.indices[2] as usize],
        ]
    }

    /// Compute the axis-aligned bounding box of all vertices.
    pub fn bounding_box(&self) -> BoundingBox3F {
        let mut bb = BoundingBox3F::new();
        for v in &self.vertices {
            bb.merge_point(*v);
        }
        bb
    }

    /// Append all triangles of another mesh, remapping its indices.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|tri| {
            Triangle::new(
                tri.indices[0] + offset,
                tri.indices[1] + offset,
                tri.indices[2] + offset,
            )
        }));
    }

    /// Validate the mesh (check for valid indices).
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len() as u32;
        for (i, tri) in self.indices.iter().enumerate() {
            for &idx in &tri.indices {
                if idx >= vertex_count {
                    return Err(Error::Mesh(format!(
                        "Triangle {} has invalid vertex index {} (only {} vertices)",
                        i, idx, vertex_count
                    )));
                }
            }
        }
        Ok(())
    }

    /// Create an axis-aligned box mesh spanning `min`..`max` (mm), outward winding.
    pub fn cuboid(min: Point3F, max: Point3F) -> Self {
        let vertices = vec![
            // Bottom face
            Point3F::new(min.x, min.y, min.z),
            Point3F::new(max.x, min.y, min.z),
            Point3F::new(max.x, max.y, min.z),
            Point3F::new(min.x, max.y, min.z),
            // Top face
            Point3F::new(min.x, min.y, max.z),
            Point3F::new(max.x, min.y, max.z),
            Point3F::new(max.x, max.y, max.z),
            Point3F::new(min.x, max.y, max.z),
        ];

        let indices = vec![
            // Bottom
            Triangle::new(0, 2, 1),
            Triangle::new(0, 3, 2),
            // Top
            Triangle::new(4, 5, 6),
            Triangle::new(4, 6, 7),
            // Front
            Triangle::new(0, 1, 5),
            Triangle::new(0, 5, 4),
            // Back
            Triangle::new(2, 3, 7),
            Triangle::new(2, 7, 6),
            // Left
            Triangle::new(0, 4, 7),
            Triangle::new(0, 7, 3),
            // Right
            Triangle::new(1, 2, 6),
            Triangle::new(1, 6, 5),
        ];

        Self::from_parts(vertices, indices)
    }

}

impl fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TriangleMesh({} vertices, {} triangles)",
            self.vertices.len(),
            self.indices.len()
        )
    }
}
