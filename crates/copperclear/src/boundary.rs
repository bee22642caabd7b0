use crate::error::{ClearError, ClearResult};
use crate::geometry::offset::offset_mitre;
use crate::geometry::{drop_slivers, is_empty_area, merge_polygons};
use crate::types::{BoundaryReference, ObjectKind, TargetObject};
use geo::{BooleanOps, ConvexHull, MultiPolygon, Polygon};
use tracing::debug;

/// Resolve the region clearing is confined to.
///
/// The margin grows the boundary with mitred corners; a zero margin leaves it as is.
pub fn resolve_boundary(
    target: &TargetObject,
    reference: &BoundaryReference,
    margin: f64,
) -> ClearResult<MultiPolygon<f64>> {
    let boundary = match reference {
        BoundaryReference::Itself => {
            let polygons = target.polygons();
            if polygons.is_empty() {
                return Err(ClearError::NoObjectAvailable);
            }
            let hull = hull_of(polygons);
            grow(&MultiPolygon::new(vec![hull]), margin)
        }
        BoundaryReference::AreaSelection(rects) => {
            if rects.is_empty() {
                return Err(ClearError::NoObjectAvailable);
            }
            let parts: Vec<Polygon<f64>> = rects
                .iter()
                .flat_map(|r| grow(&MultiPolygon::new(vec![r.to_polygon()]), margin).0)
                .collect();
            merge_polygons(&parts)
        }
        BoundaryReference::ReferenceObject(object) => {
            let reference_polygons = object.polygons();
            if reference_polygons.is_empty() {
                return Err(ClearError::NoObjectAvailable);
            }
            match object.kind {
                ObjectKind::Geometry => {
                    let parts: Vec<Polygon<f64>> = reference_polygons
                        .iter()
                        .flat_map(|p| grow(&MultiPolygon::new(vec![p.clone()]), margin).0)
                        .collect();
                    merge_polygons(&parts)
                }
                ObjectKind::Copper => {
                    let target_polygons = target.polygons();
                    if target_polygons.is_empty() {
                        return Err(ClearError::NoObjectAvailable);
                    }
                    let overlap = hull_of(reference_polygons).intersection(&hull_of(target_polygons));
                    grow(&overlap, margin)
                }
            }
        }
    };

    let boundary = drop_slivers(boundary);
    if is_empty_area(&boundary) {
        return Err(ClearError::EmptyBoundary(describe(reference)));
    }
    debug!(parts = boundary.0.len(), reference = describe(reference), "resolved boundary");
    Ok(boundary)
}

fn hull_of(polygons: Vec<Polygon<f64>>) -> Polygon<f64> {
    MultiPolygon::new(polygons).convex_hull()
}

fn grow(area: &MultiPolygon<f64>, margin: f64) -> MultiPolygon<f64> {
    if margin > 0.0 {
        offset_mitre(area, margin)
    } else {
        area.clone()
    }
}

fn describe(reference: &BoundaryReference) -> String {
    match reference {
        BoundaryReference::Itself => "convex hull of the target".to_string(),
        BoundaryReference::AreaSelection(rects) => format!("{} selected area(s)", rects.len()),
        BoundaryReference::ReferenceObject(object) => format!("reference object '{}'", object.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, BoundingRect, Geometry, Rect};

    fn copper() -> TargetObject {
        TargetObject::copper(
            "top",
            vec![
                Rect::new((0.0, 0.0), (2.0, 2.0)).to_polygon(),
                Rect::new((8.0, 8.0), (10.0, 10.0)).to_polygon(),
            ],
        )
    }

    #[test]
    fn test_itself_is_convex_hull() {
        let boundary = resolve_boundary(&copper(), &BoundaryReference::Itself, 0.0).expect("boundary");
        // Hull of two opposite corner squares: 100 minus two 8x8/2 triangles.
        assert!((boundary.unsigned_area() - 36.0).abs() < 1e-6, "area {}", boundary.unsigned_area());
    }

    #[test]
    fn test_itself_with_margin() {
        let boundary = resolve_boundary(&copper(), &BoundaryReference::Itself, 1.0).expect("boundary");
        let bounds = boundary.bounding_rect().expect("bounds");
        assert!((bounds.min().x + 1.0).abs() < 1e-6);
        assert!((bounds.max().x - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_area_selection_unions_rects() {
        let reference = BoundaryReference::AreaSelection(vec![
            Rect::new((0.0, 0.0), (4.0, 4.0)),
            Rect::new((2.0, 0.0), (6.0, 4.0)),
        ]);
        let boundary = resolve_boundary(&copper(), &reference, 0.0).expect("boundary");
        assert_eq!(boundary.0.len(), 1);
        assert!((boundary.unsigned_area() - 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_copper_reference_intersects_hulls() {
        let reference = BoundaryReference::ReferenceObject(TargetObject::copper(
            "outline",
            vec![Rect::new((5.0, -5.0), (20.0, 20.0)).to_polygon()],
        ));
        let square = TargetObject::copper("top", vec![Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon()]);
        let boundary = resolve_boundary(&square, &reference, 0.0).expect("boundary");
        assert!((boundary.unsigned_area() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_geometry_reference_uses_its_parts() {
        let reference = BoundaryReference::ReferenceObject(TargetObject::new(
            "keepout",
            vec![Geometry::Rect(Rect::new((0.0, 0.0), (3.0, 3.0)))],
            ObjectKind::Geometry,
        ));
        let boundary = resolve_boundary(&copper(), &reference, 0.0).expect("boundary");
        assert!((boundary.unsigned_area() - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_object_available() {
        let empty = TargetObject::copper("empty", vec![]);
        assert!(matches!(
            resolve_boundary(&empty, &BoundaryReference::Itself, 1.0),
            Err(ClearError::NoObjectAvailable)
        ));
        assert!(matches!(
            resolve_boundary(&copper(), &BoundaryReference::AreaSelection(vec![]), 1.0),
            Err(ClearError::NoObjectAvailable)
        ));
    }

    #[test]
    fn test_disjoint_copper_reference_is_empty() {
        let reference = BoundaryReference::ReferenceObject(TargetObject::copper(
            "far",
            vec![Rect::new((50.0, 50.0), (60.0, 60.0)).to_polygon()],
        ));
        assert!(matches!(
            resolve_boundary(&copper(), &reference, 0.0),
            Err(ClearError::EmptyBoundary(_))
        ));
    }
}
