use geo::orient::Direction;
use geo::{unary_union, Area, Coord, Geometry, LineString, MultiPolygon, Orient, Polygon};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

pub mod ids;
pub mod offset;

// Re-export public types
pub use ids::ToolId;

/// Areas below this are treated as empty.
pub const AREA_EPSILON: f64 = 1e-6;

/// Flatten arbitrarily nested geometry into its polygons.
///
/// Collections are walked with an explicit stack, so nesting depth is bounded
/// only by memory. Points and line work carry no area and are skipped.
pub fn flatten_polygons(geometries: &[Geometry<f64>]) -> Vec<Polygon<f64>> {
    let mut polygons = Vec::new();
    let mut skipped = 0usize;
    let mut stack: Vec<&Geometry<f64>> = geometries.iter().rev().collect();

    while let Some(geometry) = stack.pop() {
        match geometry {
            Geometry::Polygon(p) => polygons.push(p.clone()),
            Geometry::MultiPolygon(mp) => polygons.extend(mp.0.iter().cloned()),
            Geometry::Rect(r) => polygons.push(r.to_polygon()),
            Geometry::Triangle(t) => polygons.push(t.to_polygon()),
            Geometry::GeometryCollection(gc) => stack.extend(gc.0.iter().rev()),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "ignored non-areal geometry while flattening");
    }
    polygons
}

/// Merge possibly overlapping polygons into one clean multi-polygon.
///
/// Inputs are oriented first; the union fill rule follows the first ring's winding.
pub fn merge_polygons(polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
    if polygons.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    let oriented: Vec<Polygon<f64>> = polygons
        .iter()
        .map(|p| p.orient(Direction::Default))
        .collect();
    unary_union(oriented.iter())
}

/// True when the region has no meaningful area.
pub fn is_empty_area(area: &MultiPolygon<f64>) -> bool {
    area.0.is_empty() || area.unsigned_area() <= AREA_EPSILON
}

/// Drop parts that have no area left after set algebra.
pub fn drop_slivers(area: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        area.0
            .into_iter()
            .filter(|p| p.unsigned_area() > AREA_EPSILON)
            .collect(),
    )
}

/// Exterior ring followed by the interior rings.
pub fn polygon_rings(polygon: &Polygon<f64>) -> Vec<LineString<f64>> {
    std::iter::once(polygon.exterior().clone())
        .chain(polygon.interiors().iter().cloned())
        .collect()
}

/// Every ring of every part.
pub fn area_rings(area: &MultiPolygon<f64>) -> Vec<LineString<f64>> {
    area.0.iter().flat_map(polygon_rings).collect()
}

/// Reject kernel output containing NaN or infinite coordinates.
pub fn is_finite(area: &MultiPolygon<f64>) -> bool {
    area.0.iter().all(|p| {
        polygon_rings(p)
            .iter()
            .all(|ring| ring.0.iter().all(|c: &Coord<f64>| c.x.is_finite() && c.y.is_finite()))
    })
}

/// Run a geometry kernel operation, turning a panic or non-finite output into an error.
pub fn guarded<F>(operation: &str, f: F) -> Result<MultiPolygon<f64>, String>
where
    F: FnOnce() -> MultiPolygon<f64>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(area) if is_finite(&area) => Ok(area),
        Ok(_) => Err(format!("{operation} produced non-finite coordinates")),
        Err(_) => Err(format!("{operation} failed inside the geometry kernel")),
    }
}
