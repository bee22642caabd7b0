use copperclear::*;
use geo::{Area, BoundingRect, Geometry, GeometryCollection, Rect};

fn pads() -> TargetObject {
    TargetObject::copper(
        "top",
        vec![
            Rect::new((0.0, 0.0), (2.0, 2.0)).to_polygon(),
            Rect::new((8.0, 0.0), (10.0, 2.0)).to_polygon(),
        ],
    )
}

#[test]
fn test_hull_of_target_with_margin() {
    let boundary = resolve_boundary(&pads(), &BoundaryReference::Itself, 1.0)
        .expect("Failed to resolve boundary");
    let bounds = boundary.bounding_rect().expect("bounds");
    assert!((bounds.min().x + 1.0).abs() < 1e-6);
    assert!((bounds.max().x - 11.0).abs() < 1e-6);
    // Mitred corners keep the grown hull a rectangle
    assert!((boundary.unsigned_area() - 12.0 * 4.0).abs() < 1e-3);
}

#[test]
fn test_nested_reference_geometry_is_flattened() {
    let inner = GeometryCollection::new_from(vec![Geometry::Rect(Rect::new((0.0, 0.0), (4.0, 4.0)))]);
    let outer = GeometryCollection::new_from(vec![Geometry::GeometryCollection(inner)]);
    let reference = TargetObject::new(
        "outline",
        vec![Geometry::GeometryCollection(outer)],
        ObjectKind::Geometry,
    );

    let boundary = resolve_boundary(&pads(), &BoundaryReference::ReferenceObject(reference), 0.0)
        .expect("Failed to resolve boundary");
    assert!((boundary.unsigned_area() - 16.0).abs() < 1e-6);
}

#[test]
fn test_missing_geometry_fails() {
    let empty = TargetObject::copper("bottom", Vec::new());
    let result = resolve_boundary(&empty, &BoundaryReference::Itself, 0.0);
    assert!(matches!(result, Err(ClearError::NoObjectAvailable)));

    let job = ClearingJob::new("ncc", empty, ToolLibrary::from_diameters(&[1.0]));
    let result = clear_copper(&job, &NoProgress, &CancelToken::new());
    assert!(matches!(result, Err(ClearError::NoObjectAvailable)));
}

#[test]
fn test_copper_covering_the_boundary_leaves_nothing_to_clear() {
    let target = TargetObject::copper("top", vec![Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon()]);
    let job = ClearingJob::new("ncc", target, ToolLibrary::from_diameters(&[1.0])).with_config(
        ClearingConfig {
            margin: 0.0,
            ..Default::default()
        },
    );
    let result = clear_copper(&job, &NoProgress, &CancelToken::new());
    assert!(matches!(result, Err(ClearError::NoClearingExtent)));
}
