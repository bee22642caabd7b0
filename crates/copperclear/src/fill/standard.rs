use super::FillParams;
use crate::error::FillError;
use crate::geometry::offset::offset_round;
use crate::geometry::{area_rings, is_empty_area};
use crate::types::Toolpath;
use geo::Polygon;

/// Contour-parallel fill: repeatedly inset the polygon by the stepover until it collapses.
///
/// The first ring sits one tool radius inside the polygon edge, so the cutter
/// just touches the boundary. Holes in the polygon are respected by the offset.
pub fn fill_standard(polygon: &Polygon<f64>, params: &FillParams) -> Result<Toolpath, FillError> {
    // Step 1: Calculate stepover distance
    let stepover = params.stepover();

    // Step 2: First pass runs on the tool-centre region
    let mut current = offset_round(polygon, -params.radius(), params.steps_per_circle);
    if is_empty_area(&current) {
        return Err(FillError::ToolTooLarge {
            diameter: params.tool_diameter,
        });
    }

    // Step 3: Shrink inward by stepover until nothing is left
    let mut paths = Vec::new();
    loop {
        paths.extend(area_rings(&current));

        let next = offset_round(&current, -stepover, params.steps_per_circle);
        if is_empty_area(&next) {
            break;
        }
        current = next;
    }

    // Innermost rings first, so the cutter works outward toward the boundary
    paths.reverse();
    Ok(Toolpath::new(paths))
}
