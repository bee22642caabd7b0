use crate::config::MillingDirection;
use crate::error::ClearResult;
use crate::geometry::offset::offset_round;
use crate::geometry::{area_rings, drop_slivers, merge_polygons, ToolId};
use crate::progress::CancelToken;
use crate::types::{Tool, Toolpath};
use geo::orient::Direction;
use geo::{BooleanOps, Contains, LineString, MultiLineString, MultiPolygon, Orient, Polygon};
use tracing::{debug, warn};

/// Result of isolating the copper before bulk clearing.
#[derive(Debug, Clone)]
pub struct IsolationOutcome {
    /// Envelope paths per isolation tool, clipped to the boundary.
    pub toolpaths: Vec<(ToolId, Toolpath)>,
    /// Number of tools whose envelope was cut open by the boundary.
    pub broken_count: usize,
    /// Copper grown by the isolation envelopes, clipped to the boundary.
    pub isolated: MultiPolygon<f64>,
}

/// Mill an envelope around the copper with every isolation tool.
///
/// A ring that leaves the boundary is clipped into open pieces; milling those
/// will not fully isolate the feature, so the tool is counted as broken.
pub fn isolation_pass(
    copper: &MultiPolygon<f64>,
    boundary: &MultiPolygon<f64>,
    tools: &[&Tool],
    milling: MillingDirection,
    steps_per_circle: u32,
    cancel: &CancelToken,
) -> ClearResult<IsolationOutcome> {
    let mut toolpaths = Vec::new();
    let mut broken_count = 0;
    let mut envelopes: Vec<Polygon<f64>> = copper.0.clone();

    for tool in tools {
        cancel.check()?;

        let envelope = offset_round(copper, tool.diameter / 2.0, steps_per_circle);
        let mut paths = Vec::new();
        let mut broken = false;
        for ring in oriented_rings(&envelope, milling) {
            if boundary.contains(&ring) {
                paths.push(ring);
                continue;
            }
            let pieces = boundary.clip(&MultiLineString::new(vec![ring]), false);
            let pieces: Vec<LineString<f64>> =
                pieces.0.into_iter().filter(|p| p.0.len() >= 2).collect();
            if !pieces.is_empty() {
                broken = true;
                paths.extend(pieces);
            }
        }

        if broken {
            broken_count += 1;
            warn!(diameter = tool.diameter, "isolation envelope is broken by the boundary");
        }
        debug!(diameter = tool.diameter, paths = paths.len(), "isolation tool done");

        envelopes.extend(envelope.0);
        toolpaths.push((tool.id, Toolpath::new(paths)));
    }

    let isolated = if tools.is_empty() {
        copper.clone()
    } else {
        let merged = merge_polygons(&envelopes);
        drop_slivers(merged.intersection(boundary))
    };

    Ok(IsolationOutcome {
        toolpaths,
        broken_count,
        isolated,
    })
}

/// Envelope rings in cutting order. Climb milling reverses the default winding.
fn oriented_rings(envelope: &MultiPolygon<f64>, milling: MillingDirection) -> Vec<LineString<f64>> {
    let direction = match milling {
        MillingDirection::Conventional => Direction::Default,
        MillingDirection::Climb => Direction::Reversed,
    };
    area_rings(&envelope.orient(direction))
}
