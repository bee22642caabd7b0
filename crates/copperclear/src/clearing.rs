//! Standard clearing pass: every tool works on what earlier tools left behind.

use crate::config::ClearingConfig;
use crate::error::ClearResult;
use crate::fill::{FillParams, PolygonFill};
use crate::geometry::offset::{offset_area, open_area};
use crate::geometry::{drop_slivers, guarded, ToolId};
use crate::progress::{CancelToken, ProgressCounter, ProgressEvent, ProgressSink};
use crate::types::{Tool, Toolpath};
use geo::{BooleanOps, MultiPolygon, Polygon};
use tracing::{debug, info, warn};

/// Subtracted from consumed diameters so the last tool never sees a negative offset.
pub(crate) const TOOL_EPSILON: f64 = 1e-12;

/// Offsets at or below this are treated as no offset.
const OFFSET_EPSILON: f64 = 1e-9;

/// What one tool was handed and what counts as cleared after it ran.
#[derive(Debug, Clone)]
pub struct PassStep {
    pub tool: ToolId,
    /// The area handed to the fill for this tool.
    pub area: MultiPolygon<f64>,
    /// Area considered cleared once this tool finished.
    pub cleared: MultiPolygon<f64>,
}

/// Output of a clearing pass, before tools without geometry are dropped.
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Paths per tool, in processing order.
    pub toolpaths: Vec<(ToolId, Toolpath)>,
    /// Polygons the fill could not convert.
    pub failed_polygons: usize,
    /// Polygons no tool could clear (rest machining only).
    pub leftover: Vec<Polygon<f64>>,
    pub steps: Vec<PassStep>,
}

pub(crate) fn fill_params(tool_diameter: f64, config: &ClearingConfig) -> FillParams {
    FillParams {
        tool_diameter,
        steps_per_circle: config.steps_per_circle,
        overlap: config.overlap,
        contour: config.contour,
        connect: config.connect,
    }
}

/// Inset `area` by `distance`; negligible distances leave it untouched.
fn shrink(area: &MultiPolygon<f64>, distance: f64, steps: u32) -> MultiPolygon<f64> {
    if distance > OFFSET_EPSILON {
        offset_area(area, -distance, steps)
    } else {
        area.clone()
    }
}

/// Overall progress for polygon `done` of `parts` while running tool `tool_index` of `tools`.
pub(crate) fn run_ratio(tool_index: usize, tools: usize, done: usize, parts: usize) -> f64 {
    let within = if parts == 0 {
        1.0
    } else {
        done as f64 / parts as f64
    };
    (tool_index as f64 + within) / tools.max(1) as f64
}

/// Run the standard pass over `tools`, already in processing order.
///
/// Each tool sees the empty area inset by the diameters of the tools still to
/// come, minus what earlier tools cleared. The cleared accumulator only grows.
pub fn standard_pass(
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
    let mut cleared = MultiPolygon::new(Vec::new());
    let mut offset: f64 = tools.iter().map(|t| t.diameter).sum();

    for (tool_index, tool) in tools.iter().enumerate() {
        cancel.check()?;
        sink.report(ProgressEvent::Status(format!(
            "Clearing with tool {} ({}/{})",
            tool.diameter,
            tool_index + 1,
            tools.len()
        )));

        // Step 1: Consume this tool's diameter from the cumulative offset
        offset -= tool.diameter - TOOL_EPSILON;
        let inset = offset.max(0.0);

        // Step 2: Area for this tool, minus what is already cleared
        let area = match guarded("standard pass area", || {
            shrink(empty, inset, steps).difference(&cleared)
        }) {
            Ok(area) => drop_slivers(area),
            Err(reason) => {
                warn!(diameter = tool.diameter, %reason, "skipping tool");
                outcome.steps.push(PassStep {
                    tool: tool.id,
                    area: MultiPolygon::new(Vec::new()),
                    cleared: cleared.clone(),
                });
                outcome.toolpaths.push((tool.id, Toolpath::default()));
                continue;
            }
        };

        // Step 3: Fill every part, counting failures
        let params = fill_params(tool.diameter, config);
        let mut toolpath = Toolpath::default();
        let parts = area.0.len();
        for (index, polygon) in area.0.iter().enumerate() {
            cancel.check()?;
            match fill.fill(polygon, &params) {
                Ok(paths) => toolpath.extend(paths),
                Err(err) => {
                    outcome.failed_polygons += 1;
                    warn!(
                        diameter = tool.diameter,
                        polygon = index,
                        error = %err,
                        "polygon could not be cleared"
                    );
                }
            }
            progress.advance_ratio(run_ratio(tool_index, tools.len(), index + 1, parts), sink);
        }

        // Step 4: Grow the accumulator when the tool produced anything
        if !toolpath.is_empty() {
            let grown = guarded("cleared accumulator", || {
                let reach = shrink(empty, inset * (1.0 + config.overlap), steps);
                open_area(&reach, tool.diameter / 2.0, steps).union(&cleared)
            });
            cleared = match grown {
                Ok(union) => union,
                Err(reason) => {
                    warn!(%reason, "keeping previous cleared area");
                    cleared
                }
            };
        }

        debug!(
            diameter = tool.diameter,
            offset = inset,
            parts,
            paths = toolpath.paths.len(),
            "tool finished"
        );
        outcome.steps.push(PassStep {
            tool: tool.id,
            area,
            cleared: cleared.clone(),
        });
        outcome.toolpaths.push((tool.id, toolpath));
    }

    info!(
        tools = tools.len(),
        failed = outcome.failed_polygons,
        "standard clearing pass finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FillError;
    use crate::fill::FillMethod;
    use crate::progress::NoProgress;
    use geo::{Area, Rect};

    fn frame() -> MultiPolygon<f64> {
        let outer = Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon();
        let copper = Rect::new((4.0, 4.0), (6.0, 6.0)).to_polygon();
        MultiPolygon::new(vec![Polygon::new(
            outer.exterior().clone(),
            vec![copper.exterior().clone()],
        )])
    }

    fn config() -> ClearingConfig {
        ClearingConfig {
            steps_per_circle: 32,
            ..Default::default()
        }
    }

    struct AlwaysFails;

    impl PolygonFill for AlwaysFails {
        fn fill(&self, _polygon: &Polygon<f64>, params: &FillParams) -> Result<Toolpath, FillError> {
            Err(FillError::ToolTooLarge {
                diameter: params.tool_diameter,
            })
        }
    }

    #[test]
    fn test_run_ratio() {
        assert_eq!(run_ratio(0, 2, 1, 2), 0.25);
        assert_eq!(run_ratio(1, 2, 0, 0), 1.0);
    }

    #[test]
    fn test_single_tool_sees_whole_empty_area() {
        let tools = [Tool::clearing(1.0)];
        let refs: Vec<&Tool> = tools.iter().collect();
        let outcome = standard_pass(
            &frame(),
            &refs,
            &config(),
            &FillMethod::Seed,
            &NoProgress,
            &CancelToken::new(),
        )
        .expect("pass");

        assert_eq!(outcome.toolpaths.len(), 1);
        assert!(!outcome.toolpaths[0].1.is_empty());
        assert!((outcome.steps[0].area.unsigned_area() - frame().unsigned_area()).abs() < 1e-3);
        assert_eq!(outcome.failed_polygons, 0);
    }

    #[test]
    fn test_accumulator_is_monotonic() {
        for order in [[2.0, 1.0, 0.5], [0.5, 1.0, 2.0]] {
            let tools: Vec<Tool> = order.iter().map(|&d| Tool::clearing(d)).collect();
            let refs: Vec<&Tool> = tools.iter().collect();
            let outcome = standard_pass(
                &frame(),
                &refs,
                &config(),
                &FillMethod::Standard,
                &NoProgress,
                &CancelToken::new(),
            )
            .expect("pass");

            for pair in outcome.steps.windows(2) {
                let lost = pair[0].cleared.difference(&pair[1].cleared);
                assert!(lost.unsigned_area() < 1e-4, "accumulator shrank for order {order:?}");
            }
        }
    }

    #[test]
    fn test_later_tools_skip_cleared_area() {
        let tools = [Tool::clearing(1.0), Tool::clearing(0.5)];
        let refs: Vec<&Tool> = tools.iter().collect();
        let outcome = standard_pass(
            &frame(),
            &refs,
            &config(),
            &FillMethod::Standard,
            &NoProgress,
            &CancelToken::new(),
        )
        .expect("pass");

        let overlap = outcome.steps[1].area.intersection(&outcome.steps[0].cleared);
        assert!(overlap.unsigned_area() < 1e-4);
    }

    #[test]
    fn test_failures_are_counted_not_fatal() {
        let tools = [Tool::clearing(1.0)];
        let refs: Vec<&Tool> = tools.iter().collect();
        let outcome = standard_pass(
            &frame(),
            &refs,
            &config(),
            &AlwaysFails,
            &NoProgress,
            &CancelToken::new(),
        )
        .expect("pass");

        assert_eq!(outcome.failed_polygons, 1);
        assert!(outcome.toolpaths[0].1.is_empty());
        assert!(outcome.steps[0].cleared.0.is_empty());
    }

    #[test]
    fn test_cancel_before_first_tool() {
        let tools = [Tool::clearing(1.0)];
        let refs: Vec<&Tool> = tools.iter().collect();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = standard_pass(&frame(), &refs, &config(), &FillMethod::Seed, &NoProgress, &cancel);
        assert!(matches!(result, Err(crate::error::ClearError::Cancelled)));
    }
}
