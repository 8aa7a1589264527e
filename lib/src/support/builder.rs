//! Support field construction.
//!
//! Every mesh triangle is projected onto the grid; for each grid lattice point
//! inside the projection the exact height of the triangle's supporting plane
//! is recorded in that point's column.

use super::field::{Crossing, SupportField};
use crate::config::SupportConfig;
use crate::geometry::{cross2, orientation, BoundingBox3F, Orientation, Point, Point3};
use crate::mesh::TriangleMesh;
use crate::{scale, Coord, CoordF, Error, Result};

/// Builds a [`SupportField`] from a triangle mesh.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    cell_size: Coord,
    enabled: bool,
}

/// Per-build counters, reported through the log.
#[derive(Debug, Default, Clone, Copy)]
struct BuildStats {
    used: usize,
    degenerate: usize,
    vertical: usize,
    collapsed: usize,
    crossings: usize,
}

impl FieldBuilder {
    /// Create a builder for the given configuration.
    pub fn new(config: &SupportConfig) -> Self {
        Self {
            cell_size: config.grid_cell_size,
            enabled: config.is_enabled(),
        }
    }

    /// Build the field over the mesh's own bounding box.
    pub fn build_for_mesh(&self, mesh: &TriangleMesh) -> Result<SupportField> {
        self.build(mesh, &mesh.bounding_box())
    }

    /// Build the field over `bounds` (mm).
    ///
    /// Returns the disabled field when support is turned off. Degenerate
    /// triangles are skipped; meshes with out-of-range vertex indices are
    /// rejected.
    pub fn build(&self, mesh: &TriangleMesh, bounds: &BoundingBox3F) -> Result<SupportField> {
        if !self.enabled {
            log::debug!("Support disabled, skipping field construction");
            return Ok(SupportField::disabled());
        }
        if self.cell_size <= 0 {
            return Err(Error::Config(format!(
                "grid_cell_size must be positive, got {}",
                self.cell_size
            )));
        }

        mesh.validate()?;
        if !bounds.is_defined() {
            return Err(Error::Mesh(
                "cannot build a support field without model bounds".to_string(),
            ));
        }

        let origin = Point::new(scale(bounds.min.x), scale(bounds.min.y));
        let width = (scale(bounds.size_x()) / self.cell_size + 1).max(1) as usize;
        let height = (scale(bounds.size_y()) / self.cell_size + 1).max(1) as usize;

        let mut columns: Vec<Vec<Crossing>> = vec![Vec::new(); width * height];
        let mut stats = BuildStats::default();

        for tri_idx in 0..mesh.triangle_count() {
            let verts = mesh.triangle_vertices(tri_idx).map(|v| v.to_scaled());
            self.rasterize(verts, origin, width, height, &mut columns, &mut stats);
        }

        // Queries are evaluated at cell centers
        let half = self.cell_size / 2;
        let field = SupportField::with_columns(
            Point::new(origin.x + half, origin.y + half),
            self.cell_size,
            width,
            height,
            columns,
        )?;

        log::info!(
            "Support field: {}x{} cells, {} triangles used, {} crossings",
            width,
            height,
            stats.used,
            field.crossing_count()
        );
        log::debug!(
            "Support field skipped {} degenerate, {} vertical and {} collapsed triangles; {} raw crossings",
            stats.degenerate,
            stats.vertical,
            stats.collapsed,
            stats.crossings
        );

        Ok(field)
    }

    /// Record one triangle's crossings into the grid columns.
    fn rasterize(
        &self,
        verts: [Point3; 3],
        origin: Point,
        width: usize,
        height: usize,
        columns: &mut [Vec<Crossing>],
        stats: &mut BuildStats,
    ) {
        let [a, b, c] = verts;
        let normal = (b - a).cross(&(c - a));
        let normal_len = normal.length();
        if normal_len == 0.0 {
            stats.degenerate += 1;
            return;
        }
        if normal.z == 0 {
            // Vertical faces have no finite plane height
            stats.vertical += 1;
            return;
        }

        let cos_angle = (normal.z.abs() as CoordF / normal_len).min(1.0);
        let surface_angle = cos_angle.acos();

        let cs = self.cell_size as CoordF;
        let project = |v: Point3| {
            Point::new(
                ((v.x - origin.x) as CoordF / cs).round() as Coord,
                ((v.y - origin.y) as CoordF / cs).round() as Coord,
            )
        };
        let (p0, p1, p2) = (project(a), project(b), project(c));

        // Wind counter-clockwise so the fill rule below sees consistent edges
        let (p0, p1, p2) = match orientation(p0, p1, p2) {
            Orientation::CounterClockwise => (p0, p1, p2),
            Orientation::Clockwise => (p0, p2, p1),
            Orientation::Collinear => {
                stats.collapsed += 1;
                return;
            }
        };
        let edges = [(p0, p1), (p1, p2), (p2, p0)];

        let min_x = p0.x.min(p1.x).min(p2.x).max(0);
        let max_x = p0.x.max(p1.x).max(p2.x).min(width as Coord - 1);
        let min_y = p0.y.min(p1.y).min(p2.y).max(0);
        let max_y = p0.y.max(p1.y).max(p2.y).min(height as Coord - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let plane_d = normal.dot(&a) as CoordF;
        let (nx, ny, nz) = (normal.x as CoordF, normal.y as CoordF, normal.z as CoordF);
        let z_min = a.z.min(b.z).min(c.z) as CoordF;
        let z_max = a.z.max(b.z).max(c.z) as CoordF;

        stats.used += 1;
        for gy in min_y..=max_y {
            for gx in min_x..=max_x {
                let q = Point::new(gx, gy);
                if !edges.iter().all(|&(from, to)| covers(from, to, q)) {
                    continue;
                }

                let wx = (origin.x + gx * self.cell_size) as CoordF;
                let wy = (origin.y + gy * self.cell_size) as CoordF;
                let z = ((plane_d - nx * wx - ny * wy) / nz).clamp(z_min, z_max);
                if !z.is_finite() {
                    continue;
                }

                columns[gx as usize + gy as usize * width]
                    .push(Crossing::new(z.round() as Coord, surface_angle));
                stats.crossings += 1;
            }
        }
    }
}

/// Whether `q` is on the inner side of the counter-clockwise edge `from -> to`.
///
/// Points exactly on the edge count only for left and top edges, so a lattice
/// point on an edge shared by two triangles is recorded once.
#[inline]
fn covers(from: Point, to: Point, q: Point) -> bool {
    let edge = to - from;
    let side = cross2(edge, q - from);
    side > 0 || (side == 0 && is_top_left(edge))
}

#[inline]
fn is_top_left(edge: Point) -> bool {
    edge.y < 0 || (edge.y == 0 && edge.x < 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3F;
    use crate::mesh::Triangle;
    use crate::support::GridCell;
    use std::f64::consts::FRAC_PI_4;

    fn slab() -> TriangleMesh {
        TriangleMesh::cuboid(Point3F::new(0.0, 0.0, 5.0), Point3F::new(10.0, 10.0, 8.0))
    }

    fn ramp() -> TriangleMesh {
        // Plane z = x over a right triangle in XY
        let mut mesh = TriangleMesh::new();
        mesh.add_vertex(Point3F::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3F::new(10.0, 0.0, 10.0));
        mesh.add_vertex(Point3F::new(0.0, 10.0, 0.0));
        mesh.add_triangle_indices(0, 1, 2);
        mesh
    }

    /// Closed block with a flat base at z=3 and a two-facet roof folded
    /// along the diagonal, corners off the lattice.
    fn folded_block() -> TriangleMesh {
        let (w, d) = (8.08, 4.08);
        let mut mesh = TriangleMesh::new();
        let base = [(0.0, 0.0), (w, 0.0), (w, d), (0.0, d)]
            .map(|(x, y)| mesh.add_vertex(Point3F::new(x, y, 3.0)));
        let roof = [(0.0, 0.0, 6.0), (w, 0.0, 9.0), (w, d, 6.0), (0.0, d, 9.0)]
            .map(|(x, y, z)| mesh.add_vertex(Point3F::new(x, y, z)));

        mesh.add_triangle_indices(base[0], base[2], base[1]);
        mesh.add_triangle_indices(base[0], base[3], base[2]);
        mesh.add_triangle_indices(roof[0], roof[1], roof[2]);
        mesh.add_triangle_indices(roof[0], roof[2], roof[3]);
        for i in 0..4 {
            let j = (i + 1) % 4;
            mesh.add_triangle_indices(base[i], base[j], roof[j]);
            mesh.add_triangle_indices(base[i], roof[j], roof[i]);
        }
        mesh
    }

    fn heights(field: &SupportField, x: i64, y: i64) -> Vec<Coord> {
        field
            .column(GridCell::new(x, y))
            .iter()
            .map(|c| c.height)
            .collect()
    }

    #[test]
    fn test_slab_columns() {
        let field = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&slab())
            .unwrap();

        assert!(field.is_generated());
        assert_eq!(field.width(), 51);
        assert_eq!(field.height(), 51);
        assert_eq!(field.origin(), Point::new(100, 100));

        for &(x, y) in &[(1, 1), (25, 25), (49, 49), (10, 40), (0, 50)] {
            assert_eq!(heights(&field, x, y), vec![5_000, 8_000]);
        }
        // Right and bottom outline edges belong to the neighbouring cells
        assert!(heights(&field, 50, 25).is_empty());
        assert!(heights(&field, 25, 0).is_empty());
        let bottom = field.column(GridCell::new(20, 20))[0];
        assert!((bottom.cos_angle() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sloped_plane_heights() {
        let field = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&ramp())
            .unwrap();

        let column = field.column(GridCell::new(10, 5));
        assert_eq!(column.len(), 1);
        assert_eq!(column[0].height, 2_000);
        assert!((column[0].surface_angle - FRAC_PI_4).abs() < 1e-9);

        // Left edge is filled, the hypotenuse is not
        assert_eq!(heights(&field, 0, 20), vec![0]);
        assert!(heights(&field, 25, 25).is_empty());
        // Outside the projection
        assert!(field.column(GridCell::new(30, 30)).is_empty());
    }

    #[test]
    fn test_shared_edge_recorded_once() {
        // Two non-coplanar triangles sharing the diagonal (0,0)-(8,4) mm; the
        // rounded diagonal runs through lattice points off the true edge
        let mut mesh = TriangleMesh::new();
        let a = mesh.add_vertex(Point3F::new(0.0, 0.0, 6.0));
        let b = mesh.add_vertex(Point3F::new(8.08, 0.0, 9.0));
        let c = mesh.add_vertex(Point3F::new(8.08, 4.08, 6.0));
        let d = mesh.add_vertex(Point3F::new(0.0, 4.08, 9.0));
        mesh.add_triangle_indices(a, b, c);
        mesh.add_triangle_indices(a, c, d);

        let field = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&mesh)
            .unwrap();

        for step in 1..20 {
            let (x, y) = (2 * step, step);
            assert_eq!(heights(&field, x, y).len(), 1, "cell ({}, {})", x, y);
        }
    }

    #[test]
    fn test_closed_mesh_columns_are_paired() {
        let field = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&folded_block())
            .unwrap();

        let mut filled = 0;
        for y in 0..field.height() as i64 {
            for x in 0..field.width() as i64 {
                let column = heights(&field, x, y);
                assert_eq!(column.len() % 2, 0, "cell ({}, {}): {:?}", x, y, column);
                if let [bottom, top] = column[..] {
                    assert_eq!(bottom, 3_000);
                    assert!(top >= 6_000 && top <= 9_000);
                    filled += 1;
                }
            }
        }
        assert!(filled > 700);
    }

    #[test]
    fn test_disabled_config() {
        let field = FieldBuilder::new(&SupportConfig::disabled())
            .build_for_mesh(&slab())
            .unwrap();
        assert!(!field.is_generated());
        assert_eq!(field.crossing_count(), 0);
    }

    #[test]
    fn test_degenerate_triangles_skipped() {
        let mut mesh = slab();
        let reference = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&mesh)
            .unwrap();

        // Repeated vertex, collinear vertices, and a sliver inside one cell
        mesh.add_triangle_indices(0, 0, 1);
        let a = mesh.add_vertex(Point3F::new(1.0, 1.0, 6.0));
        let b = mesh.add_vertex(Point3F::new(2.0, 2.0, 6.0));
        let c = mesh.add_vertex(Point3F::new(3.0, 3.0, 6.0));
        mesh.add_triangle_indices(a, b, c);
        let d = mesh.add_vertex(Point3F::new(4.01, 4.01, 6.0));
        let e = mesh.add_vertex(Point3F::new(4.03, 4.01, 6.0));
        let f = mesh.add_vertex(Point3F::new(4.01, 4.03, 6.0));
        mesh.add_triangle_indices(d, e, f);

        let field = FieldBuilder::new(&SupportConfig::default())
            .build_for_mesh(&mesh)
            .unwrap();
        assert_eq!(field.crossing_count(), reference.crossing_count());
    }

    #[test]
    fn test_order_independence() {
        let mut mesh = slab();
        mesh.merge(&ramp());

        let reversed = TriangleMesh::from_parts(
            mesh.vertices().to_vec(),
            mesh.indices().iter().rev().copied().collect::<Vec<Triangle>>(),
        );

        let builder = FieldBuilder::new(&SupportConfig::default());
        let forward = builder.build_for_mesh(&mesh).unwrap();
        let backward = builder.build_for_mesh(&reversed).unwrap();

        assert_eq!(forward.cell_count(), backward.cell_count());
        for y in 0..forward.height() as i64 {
            for x in 0..forward.width() as i64 {
                let cell = GridCell::new(x, y);
                assert_eq!(forward.column(cell), backward.column(cell));
            }
        }
    }

    #[test]
    fn test_invalid_mesh_rejected() {
        let mut mesh = slab();
        mesh.add_triangle_indices(0, 1, 99);
        let result = FieldBuilder::new(&SupportConfig::default()).build_for_mesh(&mesh);
        assert!(matches!(result, Err(Error::Mesh(_))));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let result = FieldBuilder::new(&SupportConfig::default()).build_for_mesh(&TriangleMesh::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_cell_size() {
        let config = SupportConfig {
            grid_cell_size: 1_000,
            ..Default::default()
        };
        let field = FieldBuilder::new(&config).build_for_mesh(&slab()).unwrap();
        assert_eq!(field.width(), 11);
        assert_eq!(field.origin(), Point::new(500, 500));
        assert_eq!(heights(&field, 5, 5), vec![5_000, 8_000]);
    }
}
