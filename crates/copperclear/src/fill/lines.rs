use super::FillParams;
use crate::error::FillError;
use crate::geometry::offset::offset_round;
use crate::geometry::{area_rings, is_empty_area};
use crate::types::Toolpath;
use geo::{BooleanOps, BoundingRect, Coord, LineString, MultiLineString, Polygon};

/// Line fill: parallel passes along the longer side of the polygon's bounds.
pub fn fill_lines(polygon: &Polygon<f64>, params: &FillParams) -> Result<Toolpath, FillError> {
    let margin = offset_round(polygon, -params.radius(), params.steps_per_circle);
    if is_empty_area(&margin) {
        return Err(FillError::ToolTooLarge {
            diameter: params.tool_diameter,
        });
    }

    let bounds = polygon
        .bounding_rect()
        .ok_or_else(|| FillError::Degenerate("polygon has no bounds".to_string()))?;
    let horizontal = bounds.width() >= bounds.height();

    // (along-axis span, across-axis span)
    let (along, across) = if horizontal {
        ((bounds.min().x, bounds.max().x), (bounds.min().y, bounds.max().y))
    } else {
        ((bounds.min().y, bounds.max().y), (bounds.min().x, bounds.max().x))
    };

    let first = across.0 + params.radius();
    let last = across.1 - params.radius();
    let mut offsets = Vec::new();
    let mut at = first;
    while at < last {
        offsets.push(at);
        at += params.stepover();
    }
    offsets.push(last.max(first));

    let point = |a: f64, c: f64| {
        if horizontal {
            Coord { x: a, y: c }
        } else {
            Coord { x: c, y: a }
        }
    };

    let lines: Vec<LineString<f64>> = offsets
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            // Alternate direction so consecutive passes end near each other.
            let (start, end) = if i % 2 == 0 { (along.0, along.1) } else { (along.1, along.0) };
            LineString::new(vec![point(start, c), point(end, c)])
        })
        .collect();

    let clipped = margin.clip(&MultiLineString::new(lines), false);
    let mut paths: Vec<LineString<f64>> = clipped.0.into_iter().filter(|p| p.0.len() >= 2).collect();

    if params.contour {
        paths.extend(area_rings(&margin));
    }

    Ok(Toolpath::new(paths))
}
