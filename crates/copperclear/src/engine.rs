use crate::boundary::resolve_boundary;
use crate::clearing::standard_pass;
use crate::empty_area::compute_empty;
use crate::error::ClearResult;
use crate::fill::PolygonFill;
use crate::isolation::isolation_pass;
use crate::progress::{CancelToken, ProgressEvent, ProgressSink};
use crate::rest_machining::rest_pass;
use crate::result::{assemble_result, ClearingResult};
use crate::tool_library::sequence_tools;
use crate::types::ClearingJob;
use tracing::info;

/// Clear the copper of `job` with the fill strategy its configuration selects.
pub fn clear_copper(
    job: &ClearingJob,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ClearResult<ClearingResult> {
    let method = job.config.method;
    clear_copper_with(job, &method, sink, cancel)
}

/// Clear the copper of `job` with a caller-supplied fill strategy.
///
/// Nothing is returned for a run that fails or is cancelled; partial results
/// are dropped.
pub fn clear_copper_with(
    job: &ClearingJob,
    fill: &dyn PolygonFill,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ClearResult<ClearingResult> {
    let config = &job.config;
    let steps = config.steps_per_circle;

    // Step 1: Validate parameters and the tool pool
    config.validate()?;
    job.tools.validate(config.decimals)?;
    cancel.check()?;
    info!(
        output = %job.output_name,
        target = %job.target.name,
        rest_machining = config.rest_machining,
        method = ?config.method,
        "starting non-copper clearing"
    );

    // Step 2: Boundary
    sink.report(ProgressEvent::Status("Resolving the clearing boundary".to_string()));
    let boundary = resolve_boundary(&job.target, &job.reference, config.margin)?;

    // Step 3: Isolation envelopes, if any isolation tools are configured
    let copper = job.target.merged();
    let isolation_tools = job.tools.isolation_tools();
    if !isolation_tools.is_empty() {
        sink.report(ProgressEvent::Status("Isolating copper features".to_string()));
    }
    let isolation = isolation_pass(
        &copper,
        &boundary,
        &isolation_tools,
        config.milling,
        steps,
        cancel,
    )?;

    // Step 4: Area to clear
    cancel.check()?;
    sink.report(ProgressEvent::Status("Computing the area to clear".to_string()));
    let empty = compute_empty(
        &isolation.isolated,
        &boundary,
        config.copper_offset(),
        steps,
        sink,
        cancel,
    )?;

    // Step 5: Tool order
    let clearing_tools = job.tools.clearing_tools();
    let ordered = sequence_tools(&clearing_tools, config.order, config.rest_machining);

    // Step 6: Clearing pass
    let pass = if config.rest_machining {
        rest_pass(&empty, &ordered, config, fill, sink, cancel)?
    } else {
        standard_pass(&empty, &ordered, config, fill, sink, cancel)?
    };
    cancel.check()?;

    // Step 7: Assemble the result
    assemble_result(&job.output_name, &job.tools, isolation, pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClearError, ParameterError};
    use crate::progress::NoProgress;
    use crate::tool_library::ToolLibrary;
    use crate::types::{BoundaryReference, TargetObject, Tool};
    use geo::Rect;

    fn job(tools: ToolLibrary) -> ClearingJob {
        let target = TargetObject::copper("top", vec![Rect::new((4.0, 4.0), (6.0, 6.0)).to_polygon()]);
        ClearingJob::new("top_ncc", target, tools).with_reference(BoundaryReference::AreaSelection(
            vec![Rect::new((0.0, 0.0), (10.0, 10.0))],
        ))
    }

    #[test]
    fn test_invalid_config_is_rejected_before_work() {
        let mut job = job(ToolLibrary::from_diameters(&[1.0]));
        job.config.overlap = 2.0;
        let result = clear_copper(&job, &NoProgress, &CancelToken::new());
        assert!(matches!(
            result,
            Err(ClearError::InvalidParameters(ParameterError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_empty_tool_pool_is_rejected() {
        let result = clear_copper(&job(ToolLibrary::new()), &NoProgress, &CancelToken::new());
        assert!(matches!(
            result,
            Err(ClearError::InvalidParameters(ParameterError::NoTools))
        ));
    }

    #[test]
    fn test_isolation_tool_contributes_geometry() {
        let mut tools = ToolLibrary::from_diameters(&[1.0]);
        let iso = tools.add_tool(Tool::isolation(0.2));
        let mut job = job(tools);
        job.config.margin = 0.0;

        let result = clear_copper(&job, &NoProgress, &CancelToken::new()).expect("run");
        assert!(result.tool(iso).is_some());
        assert_eq!(result.summary.isolation_broken_count, 0);
        assert_eq!(result.tools.len(), 2);
    }
}
