//! Rest machining: larger tools clear what they can, the rest moves on to smaller tools.

use crate::clearing::{fill_params, run_ratio, PassOutcome, PassStep, TOOL_EPSILON};
use crate::config::ClearingConfig;
use crate::error::ClearResult;
use crate::fill::PolygonFill;
use crate::geometry::offset::offset_round;
use crate::geometry::{drop_slivers, guarded, merge_polygons};
use crate::progress::{CancelToken, ProgressCounter, ProgressEvent, ProgressSink};
use crate::types::{Tool, Toolpath};
use geo::{BooleanOps, MultiLineString, MultiPolygon, Polygon};
use tracing::{debug, info, warn};

/// Run the rest-machining pass. `tools` must already be sorted largest first.
///
/// Polygons a tool cannot fill are kept in a leftover list and retried by the
/// next tool; whatever is still left after the last tool is returned.
pub fn rest_pass(
    empty: &MultiPolygon<f64>,
    tools: &[&Tool],
    config: &ClearingConfig,
    fill: &dyn PolygonFill,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ClearResult<PassOutcome> {
    let steps = config.steps_per_circle;
    let mut outcome = PassOutcome::default();
    let mut progress = ProgressCounter::new(tools.len());
    let mut area = empty.clone();
    let mut leftover: Vec<Polygon<f64>> = Vec::new();
    let mut cleared_by_previous: Vec<Polygon<f64>> = Vec::new();

    for (tool_index, tool) in tools.iter().enumerate() {
        cancel.check()?;
        sink.report(ProgressEvent::Status(format!(
            "Rest machining with tool {} ({}/{})",
            tool.diameter,
            tool_index + 1,
            tools.len()
        )));
        let tool_used = tool.diameter - TOOL_EPSILON;

        // Step 1: Remove what the previous tool cleared
        if !cleared_by_previous.is_empty() {
            let cleared = merge_polygons(&cleared_by_previous);
            match guarded("rest area", || area.difference(&cleared)) {
                Ok(reduced) => area = reduced,
                Err(reason) => warn!(%reason, "could not subtract previously cleared area"),
            }
        }

        // Step 2: Retry what the previous tool could not clear
        if !leftover.is_empty() {
            let mut parts = std::mem::take(&mut leftover);
            parts.extend(area.0.iter().cloned());
            area = merge_polygons(&parts);
        }
        area = drop_slivers(area);
        cleared_by_previous.clear();

        // Step 3: Fill each part; failures are deferred to the next tool
        let params = fill_params(tool_used, config);
        let mut toolpath = Toolpath::default();
        let parts = area.0.len();
        for (index, polygon) in area.0.iter().enumerate() {
            cancel.check()?;
            match fill.fill(polygon, &params) {
                Ok(paths) if !paths.is_empty() => {
                    let footprint = MultiLineString::new(paths.paths.clone());
                    cleared_by_previous.extend(offset_round(&footprint, tool_used / 2.0, steps).0);
                    toolpath.extend(paths);
                }
                Ok(_) => leftover.push(polygon.clone()),
                Err(err) => {
                    outcome.failed_polygons += 1;
                    debug!(
                        diameter = tool.diameter,
                        polygon = index,
                        error = %err,
                        "deferring polygon to the next tool"
                    );
                    leftover.push(polygon.clone());
                }
            }
            progress.advance_ratio(run_ratio(tool_index, tools.len(), index + 1, parts), sink);
        }

        debug!(
            diameter = tool.diameter,
            parts,
            paths = toolpath.paths.len(),
            leftover = leftover.len(),
            "rest tool finished"
        );
        outcome.steps.push(PassStep {
            tool: tool.id,
            area: area.clone(),
            cleared: merge_polygons(&cleared_by_previous),
        });
        outcome.toolpaths.push((tool.id, toolpath));
    }

    if !leftover.is_empty() {
        warn!(polygons = leftover.len(), "area left uncleared after the smallest tool");
    }
    info!(
        tools = tools.len(),
        failed = outcome.failed_polygons,
        leftover = leftover.len(),
        "rest machining pass finished"
    );
    outcome.leftover = leftover;
    Ok(outcome)
}
