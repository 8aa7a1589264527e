//! Clipper polygon boolean operations module.
//!
//! Union, difference and offsetting for support regions, backed by the
//! geo-clipper library. Distances are passed in scaled units (µm) and
//! converted to millimetres at the geo boundary; the clipper factor keeps
//! micrometer precision.

use crate::geometry::{ExPolygon, ExPolygons, Point, Polygon};
use crate::{scale, unscale, Coord, CoordF};
use geo::{Coord as GeoCoord, LineString, MultiLineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Integer precision used by clipper for millimetre inputs.
const CLIPPER_FACTOR: f64 = 1000.0;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Square corners
    Square,
    /// Round corners
    #[default]
    Round,
    /// Mitered corners
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(0.25),
            OffsetJoinType::Miter => JoinType::Miter(2.0),
        }
    }
}

fn path_to_geo(points: &[Point]) -> LineString<f64> {
    LineString::new(
        points
            .iter()
            .map(|p| GeoCoord {
                x: unscale(p.x),
                y: unscale(p.y),
            })
            .collect(),
    )
}

fn ring_to_geo(points: &[Point]) -> LineString<f64> {
    let mut ring = path_to_geo(points);
    ring.close();
    ring
}

fn ring_from_geo(ring: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = ring
        .coords()
        .map(|c| Point::new(scale(c.x), scale(c.y)))
        .collect();

    // Our polygons are implicitly closed
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::from_points(points)
}

fn polygon_to_geo(poly: &Polygon) -> GeoPolygon<f64> {
    GeoPolygon::new(ring_to_geo(poly.points()), vec![])
}

fn expolygon_to_geo(expoly: &ExPolygon) -> GeoPolygon<f64> {
    let holes = expoly
        .holes
        .iter()
        .map(|hole| ring_to_geo(hole.points()))
        .collect();
    GeoPolygon::new(ring_to_geo(expoly.contour.points()), holes)
}

fn geo_to_expolygon(geo_poly: &GeoPolygon<f64>) -> ExPolygon {
    let holes = geo_poly.interiors().iter().map(ring_from_geo).collect();
    ExPolygon::with_holes(ring_from_geo(geo_poly.exterior()), holes)
}

fn geo_multi_to_expolygons(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .0
        .iter()
        .map(geo_to_expolygon)
        .filter(|expoly| expoly.contour.len() >= 3)
        .collect()
}

fn polygons_to_geo_multi(polys: &[Polygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        polys
            .iter()
            .filter(|p| p.len() >= 3)
            .map(polygon_to_geo)
            .collect(),
    )
}

/// Two-point outlines (single-row regions) as open paths.
fn segments_to_geo_multi(polys: &[Polygon]) -> MultiLineString<f64> {
    MultiLineString::new(
        polys
            .iter()
            .filter(|p| p.len() == 2)
            .map(|p| path_to_geo(p.points()))
            .collect(),
    )
}

fn expolygons_to_geo_multi(expolys: &[ExPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(expolys.iter().map(expolygon_to_geo).collect())
}

// ============================================================================
// Boolean Operations
// ============================================================================

/// Compute the union of two sets of polygons.
pub fn union(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() {
        return clip.to_vec();
    }
    if clip.is_empty() {
        return subject.to_vec();
    }

    let subject_geo = expolygons_to_geo_multi(subject);
    let clip_geo = expolygons_to_geo_multi(clip);
    geo_multi_to_expolygons(&subject_geo.union(&clip_geo, CLIPPER_FACTOR))
}

/// Merge a set of possibly overlapping contours into disjoint islands.
///
/// Contours with fewer than three points enclose no area and are dropped.
pub fn union_ex(polygons: &[Polygon]) -> ExPolygons {
    polygons
        .iter()
        .filter(|p| p.len() >= 3)
        .fold(Vec::new(), |acc, poly| {
            let next = geo_multi_to_expolygons(&MultiPolygon::new(vec![polygon_to_geo(poly)]));
            union(&acc, &next)
        })
}

/// Merge possibly overlapping ExPolygons into disjoint islands.
pub fn union_all(expolygons: &[ExPolygon]) -> ExPolygons {
    expolygons.iter().fold(Vec::new(), |acc, expoly| {
        union(&acc, std::slice::from_ref(expoly))
    })
}

/// Compute the difference of two sets of polygons (subject - clip).
pub fn difference(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() {
        return vec![];
    }
    if clip.is_empty() {
        return subject.to_vec();
    }

    let subject_geo = expolygons_to_geo_multi(subject);
    let clip_geo = expolygons_to_geo_multi(clip);
    geo_multi_to_expolygons(&subject_geo.difference(&clip_geo, CLIPPER_FACTOR))
}

// ============================================================================
// Offset Operations
// ============================================================================

/// Offset multiple Polygons by `delta` (µm).
///
/// Positive delta grows the polygons, negative delta shrinks them. Two-point
/// outlines are grown as open segments with square ends, giving a strip
/// `2 * delta` wide; they vanish when shrinking.
pub fn offset_polygons(polygons: &[Polygon], delta: Coord, join_type: OffsetJoinType) -> ExPolygons {
    let closed = polygons_to_geo_multi(polygons);
    let mut result = if closed.0.is_empty() {
        vec![]
    } else {
        geo_multi_to_expolygons(&closed.offset(
            unscale(delta),
            join_type.into(),
            EndType::ClosedPolygon,
            CLIPPER_FACTOR,
        ))
    };

    let segments = segments_to_geo_multi(polygons);
    if delta > 0 && !segments.0.is_empty() {
        let strips = geo_clipper::ClipperOpen::offset(
            &segments,
            unscale(delta),
            join_type.into(),
            EndType::OpenSquare,
            CLIPPER_FACTOR,
        );
        result = union(&result, &geo_multi_to_expolygons(&strips));
    }
    result
}

/// Offset multiple ExPolygons by `delta` (µm).
pub fn offset_expolygons(
    expolygons: &[ExPolygon],
    delta: Coord,
    join_type: OffsetJoinType,
) -> ExPolygons {
    if expolygons.is_empty() {
        return vec![];
    }
    if delta == 0 {
        return expolygons.to_vec();
    }

    let result = expolygons_to_geo_multi(expolygons).offset(
        unscale(delta),
        join_type.into(),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    );
    geo_multi_to_expolygons(&result)
}

/// Shrink (inset) ExPolygons by a given distance.
pub fn shrink(expolygons: &[ExPolygon], distance: Coord, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, -distance.abs(), join_type)
}

/// Grow (outset) ExPolygons by a given distance.
pub fn grow(expolygons: &[ExPolygon], distance: Coord, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, distance.abs(), join_type)
}

/// Compute the total area of a set of polygons (µm²).
pub fn total_area(expolygons: &[ExPolygon]) -> CoordF {
    expolygons.iter().map(|p| p.area()).sum()
}
